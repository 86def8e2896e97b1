//! Catalog configuration and on-disk layout.
//!
//! Every field has a default; a JSON config file only needs the fields it
//! changes.

use crate::error::{CatalogError, Result};
use crate::generate::{color_abbreviation, COLORS, SIZES};
use crate::naming::Style;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory (relative to the root) holding both tables.
pub const DATA_DIR: &str = "data";
/// Directory (relative to the data directory) holding rendered images.
pub const IMAGES_DIR: &str = "generated_images";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub root: PathBuf,
    pub product_base_url: String,
    pub image_host: String,
    /// Hosts whose images are replaced by locally rendered placeholders.
    pub external_placeholder_hosts: Vec<String>,
    /// Prefix of tag-based display images; the tag is appended.
    pub tag_image_base: String,
    pub generator: GeneratorConfig,
    pub render: RenderConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            product_base_url: "https://aura-alpine.com/products/".to_string(),
            image_host: "https://images.aura-alpine.com/".to_string(),
            external_placeholder_hosts: vec!["images.unsplash.com".to_string()],
            tag_image_base: "https://loremflickr.com/320/240/apparel,outdoor,".to_string(),
            generator: GeneratorConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub colors_per_item: usize,
    pub sizes_per_item: usize,
    pub price_min_cents: i64,
    pub price_max_cents: i64,
    pub inventory_max: i64,
    pub id_prefix: String,
    pub first_number: u64,
    /// Salt for attribute draws; names ignore it.
    pub catalog_seed: u64,
    pub style: Style,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            colors_per_item: 2,
            sizes_per_item: 3,
            price_min_cents: 1500,
            price_max_cents: 25000,
            inventory_max: 100,
            id_prefix: "AA".to_string(),
            first_number: 10001,
            catalog_seed: 0,
            style: Style::Brand,
        }
    }
}

impl GeneratorConfig {
    /// Variations emitted per item.
    pub fn variations_per_item(&self) -> usize {
        self.colors_per_item * self.sizes_per_item
    }

    pub fn validate(&self) -> Result<()> {
        if self.colors_per_item == 0 || self.colors_per_item > COLORS.len() {
            return Err(CatalogError::InvalidConfig(format!(
                "colors_per_item must be in 1..={}",
                COLORS.len()
            )));
        }
        if self.sizes_per_item == 0 || self.sizes_per_item > SIZES.len() {
            return Err(CatalogError::InvalidConfig(format!(
                "sizes_per_item must be in 1..={}",
                SIZES.len()
            )));
        }
        if self.price_min_cents < 0 || self.price_min_cents > self.price_max_cents {
            return Err(CatalogError::InvalidConfig(format!(
                "price bounds {}..={} are inverted or negative",
                self.price_min_cents, self.price_max_cents
            )));
        }
        if self.inventory_max < 0 {
            return Err(CatalogError::InvalidConfig(
                "inventory_max must be non-negative".to_string(),
            ));
        }
        if self.id_prefix.trim().is_empty() {
            return Err(CatalogError::InvalidConfig("id_prefix is blank".to_string()));
        }
        // Distinct colours must stay distinct after abbreviation or
        // variation ids collide within an item.
        let mut seen = HashSet::new();
        for color in COLORS {
            if !seen.insert(color_abbreviation(color)) {
                return Err(CatalogError::InvalidConfig(format!(
                    "colour `{color}` collides with another colour's abbreviation"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub font_size: f32,
    pub jpeg_quality: u8,
    /// TrueType fonts tried in order when the renderer starts.
    pub font_candidates: Vec<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            font_size: 36.0,
            jpeg_quality: 85,
            font_candidates: vec![
                PathBuf::from("DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
                PathBuf::from("/Library/Fonts/Arial Bold.ttf"),
            ],
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CatalogError::InvalidConfig(
                "render width and height must be non-zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CatalogError::InvalidConfig(
                "jpeg_quality must be in 1..=100".to_string(),
            ));
        }
        if !(self.font_size > 0.0) {
            return Err(CatalogError::InvalidConfig(
                "font_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl CatalogConfig {
    /// Load from a JSON file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
                serde_json::from_str(&text)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        self.render.validate()
    }

    pub fn layout(&self) -> CatalogLayout {
        CatalogLayout::new(&self.root)
    }

    /// True when `url` is served by a known external placeholder host.
    pub fn is_external_placeholder(&self, url: &str) -> bool {
        self.external_placeholder_hosts
            .iter()
            .any(|host| !host.is_empty() && url.contains(host.as_str()))
    }
}

/// File locations for one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLayout {
    root: PathBuf,
}

impl CatalogLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn items_csv(&self) -> PathBuf {
        self.data_dir().join("items.csv")
    }

    pub fn variations_csv(&self) -> PathBuf {
        self.data_dir().join("variations.csv")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir().join(IMAGES_DIR)
    }

    /// Root-relative reference written into `image_url` for a rendered slug.
    pub fn image_ref(slug: &str) -> String {
        format!("{DATA_DIR}/{IMAGES_DIR}/{slug}.jpg")
    }

    /// Absolute location of a rendered slug.
    pub fn image_path(&self, slug: &str) -> PathBuf {
        self.images_dir().join(format!("{slug}.jpg"))
    }
}

/// Backup location for a table: `<table>.bak` next to it.
pub fn backup_path(table: &Path) -> PathBuf {
    let mut name = table.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}
