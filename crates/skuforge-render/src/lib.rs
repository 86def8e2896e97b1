//! Placeholder images for Skuforge catalogs
//!
//! Rasterizes solid-background placeholders with a centred label and keeps
//! them in a slug-keyed directory under the catalog root. Plugs into the
//! core crate through [`skuforge_core::PlaceholderCache`].

pub mod cache;
pub mod glyphs;
pub mod raster;

pub use cache::RenderedImageStore;
pub use raster::{BitmapRenderer, FontRenderer, Rasterizer, TextRenderer};

use skuforge_core::CatalogConfig;

/// Image store for `config`'s catalog, with the renderer chosen once here.
pub fn image_store(config: &CatalogConfig) -> RenderedImageStore {
    RenderedImageStore::new(config.layout(), Rasterizer::from_config(&config.render))
}
