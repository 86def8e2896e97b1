//! Delimited table files.
//!
//! Writes never touch the live file in place: rows go to `<table>.tmp`,
//! which is flushed and then renamed over the target. A crash mid-write
//! leaves the previous table intact. Staging and renaming are separate steps
//! so that a pair of tables can be staged together and renamed only once
//! both temp files are complete.

use crate::config::backup_path;
use crate::error::{CatalogError, Result};
use crate::model::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read every row of a table with a header line.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CatalogError::MissingTable {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(CatalogError::io(path, e)),
    };
    let mut reader = csv::Reader::from_reader(io::BufReader::new(file));
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| CatalogError::csv(path, e))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read table");
    Ok(rows)
}

/// Replace the table at `path` with `rows`, atomically.
pub fn write_table<T: Row + Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    stage_table(path, rows)?.commit()
}

/// A fully written `<table>.tmp` waiting to replace its table. Dropping it
/// without [`StagedTable::commit`] removes the temp file.
#[must_use = "a staged table is discarded unless committed"]
#[derive(Debug)]
pub struct StagedTable {
    tmp: PathBuf,
    target: PathBuf,
    rows: usize,
    committed: bool,
}

impl StagedTable {
    /// Rename the temp file over the table.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.target).map_err(|e| CatalogError::io(&self.target, e))?;
        self.committed = true;
        tracing::debug!(path = %self.target.display(), rows = self.rows, "wrote table");
        Ok(())
    }
}

impl Drop for StagedTable {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Write `rows` next to `path` without touching the live table. The header
/// is always written, even for an empty table.
pub fn stage_table<T: Row + Serialize>(path: &Path, rows: &[T]) -> Result<StagedTable> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }
    let staged = StagedTable {
        tmp: tmp_path(path),
        target: path.to_path_buf(),
        rows: rows.len(),
        committed: false,
    };
    write_rows(&staged.tmp, rows)?;
    Ok(staged)
}

fn write_rows<T: Row + Serialize>(tmp: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(tmp).map_err(|e| CatalogError::io(tmp, e))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&file);
        writer
            .write_record(T::COLUMNS)
            .map_err(|e| CatalogError::csv(tmp, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| CatalogError::csv(tmp, e))?;
        }
        writer.flush().map_err(|e| CatalogError::io(tmp, e))?;
    }
    file.sync_all().map_err(|e| CatalogError::io(tmp, e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Copy the untouched table to `<table>.bak` unless a backup already
/// exists. Returns whether a backup was written.
pub fn ensure_backup(path: &Path) -> Result<bool> {
    let backup = backup_path(path);
    let mut target = match OpenOptions::new().write(true).create_new(true).open(&backup) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(backup = %backup.display(), "backup already present");
            return Ok(false);
        }
        Err(e) => return Err(CatalogError::io(&backup, e)),
    };
    let copied = File::open(path)
        .and_then(|mut source| io::copy(&mut source, &mut target))
        .and_then(|_| target.flush())
        .and_then(|()| target.sync_all());
    if let Err(e) = copied {
        drop(target);
        let _ = fs::remove_file(&backup);
        return Err(CatalogError::io(path, e));
    }
    tracing::info!(backup = %backup.display(), "backup written");
    Ok(true)
}
