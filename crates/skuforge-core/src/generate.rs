//! Catalog generation from scratch.
//!
//! Each item's attributes come from its own generator (see [`crate::seed`]),
//! so regenerating with the same configuration is byte-identical and the
//! rows for item `n` do not depend on how many items precede it.

use crate::config::{CatalogConfig, GeneratorConfig};
use crate::error::Result;
use crate::model::{Group, Item, Price, Variation};
use crate::naming;
use crate::seed::{entity_rng, EntityRng, Stream};
use crate::slug::{slugify, ITEM_SLUG_FALLBACK};
use rand::seq::index;
use rand::Rng;

pub const BRANDS: &[&str] = &["Aura & Alpine", "Alpine Tech", "Urban Peak", "Summit Style"];

pub const GENDERS: &[&str] = &["Men", "Women", "Unisex"];

pub const COLORS: &[&str] = &[
    "Midnight Black",
    "Arctic White",
    "Slate Grey",
    "Forest Green",
    "Sandstone",
    "Ocean Blue",
];

pub const SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL"];

/// Colour token used inside variation ids: first three characters, uppercased.
pub fn color_abbreviation(color: &str) -> String {
    color.trim().chars().take(3).collect::<String>().to_uppercase()
}

pub fn variation_id(item_id: &str, color: &str, size: &str) -> String {
    format!("{item_id}-{}-{}", color_abbreviation(color), size.trim())
}

/// Both tables of a catalog, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub items: Vec<Item>,
    pub variations: Vec<Variation>,
}

impl Catalog {
    pub fn variations_of<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a Variation> + 'a {
        self.variations.iter().filter(move |v| v.item_id == item_id)
    }
}

/// Builds a fresh catalog.
pub struct CatalogGenerator<'a> {
    config: &'a CatalogConfig,
}

impl<'a> CatalogGenerator<'a> {
    pub fn new(config: &'a CatalogConfig) -> Result<Self> {
        config.generator.validate()?;
        Ok(Self { config })
    }

    fn settings(&self) -> &GeneratorConfig {
        &self.config.generator
    }

    pub fn item_id(&self, index: usize) -> String {
        let g = self.settings();
        format!("{}-{:05}", g.id_prefix, g.first_number + index as u64)
    }

    /// Generate `count` items and their variations.
    pub fn generate(&self, count: usize) -> Catalog {
        let mut catalog = Catalog {
            items: Vec::with_capacity(count),
            variations: Vec::with_capacity(count * self.settings().variations_per_item()),
        };
        for index in 0..count {
            let id = self.item_id(index);
            let mut rng = entity_rng(&id, Stream::generation(self.settings().catalog_seed));
            let item = self.build_item(&id, &mut rng);
            self.build_variations(&item, &mut rng, &mut catalog.variations);
            catalog.items.push(item);
        }
        tracing::info!(
            items = catalog.items.len(),
            variations = catalog.variations.len(),
            "generated catalog"
        );
        catalog
    }

    fn build_item(&self, id: &str, rng: &mut EntityRng) -> Item {
        let g = self.settings();
        let brand = BRANDS[rng.random_range(0..BRANDS.len())];
        let gender = GENDERS[rng.random_range(0..GENDERS.len())];
        let price = Price::from_cents(rng.random_range(g.price_min_cents..=g.price_max_cents));

        let item_name = naming::name(id, brand, g.style);
        let url = format!(
            "{}{}",
            self.config.product_base_url,
            slugify(&item_name, ITEM_SLUG_FALLBACK)
        );
        Item {
            id: id.to_string(),
            image_url: format!("{}{id}.jpg", self.config.image_host),
            url,
            description: format!("A high-quality {brand} product designed for {gender}."),
            group_ids: Group::for_gender(gender).to_string(),
            price,
            brand: brand.to_string(),
            gender: gender.to_string(),
            item_name,
        }
    }

    // One variation per colour x size pair; both selections are drawn
    // without replacement so every pair (and so every id) is distinct.
    fn build_variations(&self, item: &Item, rng: &mut EntityRng, out: &mut Vec<Variation>) {
        let g = self.settings();
        let colors = index::sample(rng, COLORS.len(), g.colors_per_item);
        let sizes = index::sample(rng, SIZES.len(), g.sizes_per_item);

        for c in colors.iter() {
            let color = COLORS[c];
            for s in sizes.iter() {
                let size = SIZES[s];
                out.push(Variation {
                    variation_id: variation_id(&item.id, color, size),
                    item_id: item.id.clone(),
                    item_name: Variation::display_name(&item.item_name, color, size),
                    image_url: format!(
                        "{}{}-{}.jpg",
                        self.config.image_host,
                        item.id,
                        color_abbreviation(color).to_lowercase()
                    ),
                    color: color.to_string(),
                    size: size.to_string(),
                    inventory: rng.random_range(0..=g.inventory_max),
                });
            }
        }
    }
}
