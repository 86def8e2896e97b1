//! On-disk catalog passes.
//!
//! Each pass reads both tables in full, computes new tables, and commits by
//! atomic replacement. The first mutating commit backs up each table first.
//! There is no locking: callers must not run two passes against the same
//! catalog at once.

use crate::config::{CatalogConfig, CatalogLayout};
use crate::error::Result;
use crate::generate::{Catalog, CatalogGenerator};
use crate::image::{ImageResolver, PlaceholderCache};
use crate::model::{Item, Variation};
use crate::mutate::CatalogMutator;
use crate::naming::Style;
use crate::config::backup_path;
use crate::table::{ensure_backup, read_table, stage_table, StagedTable};
use crate::validate::{validate, IntegrityReport};

/// Result of one mutation pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub items_changed: bool,
    pub variations_changed: bool,
    /// Rows whose image was replaced (`localize-images` only).
    pub rows_rewritten: usize,
    pub backups_written: usize,
    pub before: IntegrityReport,
    pub after: IntegrityReport,
}

impl PassOutcome {
    /// Checks that got worse during the pass.
    pub fn regressions(&self) -> Vec<&'static str> {
        self.after.regressions_since(&self.before)
    }
}

pub struct CatalogStore {
    layout: CatalogLayout,
}

impl CatalogStore {
    pub fn new(layout: CatalogLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    /// Read both tables. Fails with `MissingTable` before reading anything
    /// if either file is absent.
    pub fn load(&self) -> Result<Catalog> {
        for path in [self.layout.items_csv(), self.layout.variations_csv()] {
            if !path.exists() {
                return Err(crate::error::CatalogError::MissingTable { path });
            }
        }
        Ok(Catalog {
            items: read_table(&self.layout.items_csv())?,
            variations: read_table(&self.layout.variations_csv())?,
        })
    }

    pub fn load_items(&self) -> Result<Vec<Item>> {
        read_table(&self.layout.items_csv())
    }

    pub fn validate(&self) -> Result<IntegrityReport> {
        let catalog = self.load()?;
        Ok(validate(&catalog.items, &catalog.variations))
    }

    /// Discard and replace both tables with a fresh catalog.
    ///
    /// Backups left by an earlier catalog are kept as they are. Since a
    /// backup is never overwritten, the first pass over the new catalog
    /// writes no backup of its own; remove the `.bak` files first to get one.
    pub fn regenerate(&self, config: &CatalogConfig, count: usize) -> Result<Catalog> {
        let catalog = CatalogGenerator::new(config)?.generate(count);
        let staged = [
            Some(stage_table(&self.layout.items_csv(), &catalog.items)?),
            Some(stage_table(&self.layout.variations_csv(), &catalog.variations)?),
        ];
        commit_all(staged)?;
        for table in [self.layout.items_csv(), self.layout.variations_csv()] {
            let backup = backup_path(&table);
            if backup.exists() {
                tracing::warn!(
                    backup = %backup.display(),
                    "backup from an earlier catalog kept; the next pass will not back up this one"
                );
            }
        }
        Ok(catalog)
    }

    /// Restyle names, descriptions, urls and images.
    pub fn refresh(
        &self,
        config: &CatalogConfig,
        cache: &dyn PlaceholderCache,
        style: Style,
    ) -> Result<PassOutcome> {
        let before = self.load()?;
        let mutator = CatalogMutator::new(config, ImageResolver::new(config, cache));
        let after = mutator.mutate(&before.items, &before.variations, style)?;
        self.commit(&before, after, 0)
    }

    /// Rename items and variations with the trail lexicon.
    pub fn improve_names(&self, config: &CatalogConfig) -> Result<PassOutcome> {
        let before = self.load()?;
        let mutator = CatalogMutator::new(config, ImageResolver::read_only(config));
        let after = mutator.improve_names(&before.items, &before.variations);
        self.commit(&before, after, 0)
    }

    /// Render local placeholders for variations on external placeholder
    /// hosts. The table is only rewritten if some row changed.
    pub fn localize_images(
        &self,
        config: &CatalogConfig,
        cache: &dyn PlaceholderCache,
    ) -> Result<PassOutcome> {
        let before = self.load()?;
        let mutator = CatalogMutator::new(config, ImageResolver::new(config, cache));
        let (variations, rewritten) = mutator.localize_images(&before.variations)?;
        let after = Catalog {
            items: before.items.clone(),
            variations,
        };
        self.commit(&before, after, rewritten)
    }

    fn commit(&self, before: &Catalog, after: Catalog, rows_rewritten: usize) -> Result<PassOutcome> {
        let items_changed = before.items != after.items;
        let variations_changed = before.variations != after.variations;

        let mut backups_written = 0;
        let tables: [(bool, _); 2] = [
            (items_changed, self.layout.items_csv()),
            (variations_changed, self.layout.variations_csv()),
        ];
        for (changed, path) in &tables {
            if *changed && ensure_backup(path)? {
                backups_written += 1;
            }
        }
        // Both temp files are complete before either table is replaced.
        let staged = [
            items_changed
                .then(|| stage_table::<Item>(&tables[0].1, &after.items))
                .transpose()?,
            variations_changed
                .then(|| stage_table::<Variation>(&tables[1].1, &after.variations))
                .transpose()?,
        ];
        commit_all(staged)?;

        let outcome = PassOutcome {
            items_changed,
            variations_changed,
            rows_rewritten,
            backups_written,
            before: validate(&before.items, &before.variations),
            after: validate(&after.items, &after.variations),
        };
        let regressions = outcome.regressions();
        if !regressions.is_empty() {
            tracing::warn!(?regressions, "pass introduced integrity failures");
        }
        Ok(outcome)
    }
}

fn commit_all(staged: [Option<StagedTable>; 2]) -> Result<()> {
    for table in staged.into_iter().flatten() {
        table.commit()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::image::PlaceholderRequest;
    use std::fs;
    use tempfile::tempdir;

    struct PathOnlyCache;

    impl PlaceholderCache for PathOnlyCache {
        fn ensure(&self, request: &PlaceholderRequest) -> Result<String> {
            Ok(CatalogLayout::image_ref(&request.slug))
        }
    }

    fn store_with(n: usize) -> (tempfile::TempDir, CatalogConfig, CatalogStore) {
        let dir = tempdir().unwrap();
        let config = CatalogConfig {
            root: dir.path().to_path_buf(),
            ..CatalogConfig::default()
        };
        let store = CatalogStore::new(config.layout());
        store.regenerate(&config, n).unwrap();
        (dir, config, store)
    }

    #[test]
    fn load_without_tables_is_missing_table() {
        let dir = tempdir().unwrap();
        let store = CatalogStore::new(CatalogLayout::new(dir.path()));
        assert!(matches!(store.load(), Err(CatalogError::MissingTable { .. })));
        assert!(matches!(
            store.refresh(&CatalogConfig::default(), &PathOnlyCache, Style::Brand),
            Err(CatalogError::MissingTable { .. })
        ));
        assert!(!dir.path().join("data").exists());
    }

    #[test]
    fn regenerate_round_trips() {
        let (_dir, config, store) = store_with(25);
        let loaded = store.load().unwrap();
        assert_eq!(loaded, CatalogGenerator::new(&config).unwrap().generate(25));
        assert!(store.validate().unwrap().is_pass());
    }

    #[test]
    fn first_refresh_backs_up_original_tables() {
        let (_dir, config, store) = store_with(10);
        let items_csv = store.layout().items_csv();
        let original = fs::read(&items_csv).unwrap();

        let outcome = store.refresh(&config, &PathOnlyCache, Style::Casual).unwrap();
        assert!(outcome.items_changed && outcome.variations_changed);
        assert_eq!(outcome.backups_written, 2);
        assert_eq!(fs::read(backup_path(&items_csv)).unwrap(), original);

        let outcome = store.refresh(&config, &PathOnlyCache, Style::Premium).unwrap();
        assert_eq!(outcome.backups_written, 0);
        assert_eq!(fs::read(backup_path(&items_csv)).unwrap(), original);
    }

    #[test]
    fn second_identical_refresh_is_byte_stable() {
        let (_dir, config, store) = store_with(30);
        store.refresh(&config, &PathOnlyCache, Style::Adjective).unwrap();
        let items = fs::read(store.layout().items_csv()).unwrap();
        let variations = fs::read(store.layout().variations_csv()).unwrap();

        let outcome = store.refresh(&config, &PathOnlyCache, Style::Adjective).unwrap();
        assert!(!outcome.items_changed && !outcome.variations_changed);
        assert_eq!(fs::read(store.layout().items_csv()).unwrap(), items);
        assert_eq!(fs::read(store.layout().variations_csv()).unwrap(), variations);
        assert!(outcome.regressions().is_empty());
    }

    #[test]
    fn failed_stage_replaces_neither_table() {
        let (_dir, config, store) = store_with(12);
        let items = fs::read(store.layout().items_csv()).unwrap();
        let variations = fs::read(store.layout().variations_csv()).unwrap();
        // A directory where the variations temp file would go.
        let mut blocker = store.layout().variations_csv().into_os_string();
        blocker.push(".tmp");
        fs::create_dir(&blocker).unwrap();

        let err = store.refresh(&config, &PathOnlyCache, Style::Premium).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert_eq!(fs::read(store.layout().items_csv()).unwrap(), items);
        assert_eq!(fs::read(store.layout().variations_csv()).unwrap(), variations);
        let mut items_tmp = store.layout().items_csv().into_os_string();
        items_tmp.push(".tmp");
        assert!(!std::path::Path::new(&items_tmp).exists());
    }

    #[test]
    fn empty_catalog_still_has_headers() {
        let (_dir, _config, store) = store_with(0);
        let items = fs::read_to_string(store.layout().items_csv()).unwrap();
        let variations = fs::read_to_string(store.layout().variations_csv()).unwrap();
        assert!(items.starts_with("id,item_name,"));
        assert!(variations.starts_with("variation_id,item_id,"));
        let catalog = store.load().unwrap();
        assert!(catalog.items.is_empty() && catalog.variations.is_empty());
        assert!(store.validate().unwrap().is_pass());
    }

    #[test]
    fn regenerate_keeps_earlier_backups() {
        let (_dir, config, store) = store_with(6);
        store.refresh(&config, &PathOnlyCache, Style::Casual).unwrap();
        let items_bak = backup_path(&store.layout().items_csv());
        let first_backup = fs::read(&items_bak).unwrap();

        store.regenerate(&config, 9).unwrap();
        let outcome = store.refresh(&config, &PathOnlyCache, Style::Premium).unwrap();
        assert!(outcome.items_changed);
        assert_eq!(outcome.backups_written, 0);
        assert_eq!(fs::read(&items_bak).unwrap(), first_backup);
    }

    #[test]
    fn localize_without_placeholders_writes_nothing() {
        let (_dir, config, store) = store_with(5);
        let outcome = store.localize_images(&config, &PathOnlyCache).unwrap();
        assert_eq!(outcome.rows_rewritten, 0);
        assert!(!outcome.variations_changed);
        assert!(!backup_path(&store.layout().variations_csv()).exists());
    }
}
