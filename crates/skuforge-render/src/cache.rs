//! Slug-keyed store of rendered placeholders.
//!
//! The image directory is a derived cache: a slug maps to exactly one file,
//! and an existing file is never re-rendered.

use crate::raster::Rasterizer;
use skuforge_core::{CatalogError, CatalogLayout, PlaceholderCache, PlaceholderRequest, Result};
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

pub struct RenderedImageStore {
    layout: CatalogLayout,
    rasterizer: Rasterizer,
    rendered: Cell<usize>,
    reused: Cell<usize>,
}

impl RenderedImageStore {
    pub fn new(layout: CatalogLayout, rasterizer: Rasterizer) -> Self {
        Self {
            layout,
            rasterizer,
            rendered: Cell::new(0),
            reused: Cell::new(0),
        }
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Images rendered by this store so far.
    pub fn rendered(&self) -> usize {
        self.rendered.get()
    }

    /// Requests answered by an existing file.
    pub fn reused(&self) -> usize {
        self.reused.get()
    }

    fn write_atomic(&self, target: &PathBuf, bytes: &[u8]) -> Result<()> {
        let mut tmp = target.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes).map_err(|e| CatalogError::io(&tmp, e))?;
        fs::rename(&tmp, target).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            CatalogError::io(target, e)
        })
    }
}

impl PlaceholderCache for RenderedImageStore {
    fn ensure(&self, request: &PlaceholderRequest) -> Result<String> {
        let reference = CatalogLayout::image_ref(&request.slug);
        let path = self.layout.image_path(&request.slug);
        if path.exists() {
            self.reused.set(self.reused.get() + 1);
            tracing::trace!(slug = %request.slug, "reusing rendered image");
            return Ok(reference);
        }

        let dir = self.layout.images_dir();
        fs::create_dir_all(&dir).map_err(|e| CatalogError::io(&dir, e))?;
        let bytes = self.rasterizer.encode_jpeg(request)?;
        self.write_atomic(&path, &bytes)?;
        self.rendered.set(self.rendered.get() + 1);
        tracing::debug!(slug = %request.slug, renderer = self.rasterizer.renderer_name(), "rendered placeholder");
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skuforge_core::{RenderConfig, Swatch};
    use tempfile::tempdir;

    fn store(root: &std::path::Path) -> RenderedImageStore {
        let config = RenderConfig {
            width: 64,
            height: 64,
            font_candidates: Vec::new(),
            ..RenderConfig::default()
        };
        RenderedImageStore::new(CatalogLayout::new(root), Rasterizer::from_config(&config))
    }

    fn request(slug: &str, label: &str) -> PlaceholderRequest {
        PlaceholderRequest {
            slug: slug.to_string(),
            label: label.to_string(),
            background: Swatch::hex(0x26466d),
        }
    }

    #[test]
    fn renders_once_per_slug() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let first = store.ensure(&request("ridge-tee", "Ridge Tee")).unwrap();
        assert_eq!(first, "data/generated_images/ridge-tee.jpg");
        let file = dir.path().join(&first);
        assert!(file.exists());
        let bytes = fs::read(&file).unwrap();

        // Same slug, different label: the existing file wins.
        let second = store.ensure(&request("ridge-tee", "Something Else")).unwrap();
        assert_eq!(second, first);
        assert_eq!(fs::read(&file).unwrap(), bytes);
        assert_eq!((store.rendered(), store.reused()), (1, 1));
    }

    #[test]
    fn existing_files_are_not_rerendered_across_stores() {
        let dir = tempdir().unwrap();
        store(dir.path()).ensure(&request("harbor-vest", "Harbor Vest")).unwrap();
        let again = store(dir.path());
        again.ensure(&request("harbor-vest", "Harbor Vest")).unwrap();
        assert_eq!(again.rendered(), 0);
        assert_eq!(again.reused(), 1);
    }

    #[test]
    fn leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        store.ensure(&request("a", "A")).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path().join("data/generated_images"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.jpg"]);
    }
}
