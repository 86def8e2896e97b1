//! Re-derivation passes over an existing catalog.
//!
//! Every pass is keyed by the immutable `id`/`item_id` columns and never
//! creates, deletes or re-keys rows. Running a pass twice with the same
//! inputs yields the same tables.

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::generate::Catalog;
use crate::image::{ImageResolver, ImageSubject, PlaceholderRequest};
use crate::model::{Item, Variation};
use crate::naming::{self, Lexicon, Style};
use crate::palette;
use crate::slug::{slugify, ITEM_SLUG_FALLBACK};
use std::collections::HashMap;

/// Marketing blurb for a refreshed item.
pub fn describe(name: &str, brand: &str) -> String {
    let brand = brand.trim();
    if brand.is_empty() {
        format!("The {name}: premium apparel built for everyday adventure.")
    } else {
        format!("The {name} from {brand}: premium apparel built for everyday adventure.")
    }
}

/// What a parent contributes to its variations.
struct ParentView<'a> {
    name: &'a str,
    image_url: Option<&'a str>,
}

pub struct CatalogMutator<'a> {
    config: &'a CatalogConfig,
    resolver: ImageResolver<'a>,
}

impl<'a> CatalogMutator<'a> {
    pub fn new(config: &'a CatalogConfig, resolver: ImageResolver<'a>) -> Self {
        Self { config, resolver }
    }

    /// Restyle names, descriptions, urls and images.
    pub fn mutate(&self, items: &[Item], variations: &[Variation], style: Style) -> Result<Catalog> {
        let mut new_items = Vec::with_capacity(items.len());
        for item in items {
            new_items.push(self.restyle_item(item, style)?);
        }
        let variations = relink_variations(&new_items, variations, true);
        tracing::info!(%style, items = new_items.len(), variations = variations.len(), "restyled catalog");
        Ok(Catalog {
            items: new_items,
            variations,
        })
    }

    fn restyle_item(&self, item: &Item, style: Style) -> Result<Item> {
        let name = naming::name(&item.id, &item.brand, style);
        let slug = slugify(&name, ITEM_SLUG_FALLBACK);
        let image_url = self.resolver.render(&PlaceholderRequest {
            slug: slug.clone(),
            label: name.clone(),
            background: palette::for_entity(&item.id),
        })?;
        Ok(Item {
            description: describe(&name, &item.brand),
            url: format!("{}{slug}", self.config.product_base_url),
            image_url,
            item_name: name,
            ..item.clone()
        })
    }

    /// Rename items with the trail lexicon. Descriptions, urls and images
    /// are left alone.
    pub fn improve_names(&self, items: &[Item], variations: &[Variation]) -> Catalog {
        let lexicon = Lexicon::trail();
        let items: Vec<Item> = items
            .iter()
            .map(|item| Item {
                item_name: lexicon.name(&item.id, &item.brand),
                ..item.clone()
            })
            .collect();
        let variations = relink_variations(&items, variations, false);
        tracing::info!(items = items.len(), "improved item names");
        Catalog { items, variations }
    }

    /// Replace external placeholder images on variations with local
    /// renders. Returns the new rows and how many were rewritten.
    pub fn localize_images(&self, variations: &[Variation]) -> Result<(Vec<Variation>, usize)> {
        let mut changed = 0;
        let mut out = Vec::with_capacity(variations.len());
        for v in variations {
            if !self.config.is_external_placeholder(&v.image_url) {
                out.push(v.clone());
                continue;
            }
            let resolved = self.resolver.resolve(&ImageSubject::from(v))?;
            changed += 1;
            out.push(Variation {
                image_url: resolved.as_str().to_string(),
                ..v.clone()
            });
        }
        tracing::info!(changed, "localized variation images");
        Ok((out, changed))
    }
}

// Rebuild variation names (and optionally images) from their parents.
// Orphans pass through untouched.
fn relink_variations(items: &[Item], variations: &[Variation], with_images: bool) -> Vec<Variation> {
    let mut parents: HashMap<&str, ParentView<'_>> = HashMap::with_capacity(items.len());
    for item in items {
        parents.entry(item.id.as_str()).or_insert(ParentView {
            name: &item.item_name,
            image_url: with_images.then_some(item.image_url.as_str()),
        });
    }

    variations
        .iter()
        .map(|v| match parents.get(v.item_id.as_str()) {
            Some(parent) => Variation {
                item_name: Variation::display_name(parent.name, &v.color, &v.size),
                image_url: parent
                    .image_url
                    .map_or_else(|| v.image_url.clone(), str::to_string),
                ..v.clone()
            },
            None => {
                tracing::debug!(variation = %v.variation_id, item = %v.item_id, "orphan variation left untouched");
                v.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogLayout;
    use crate::generate::CatalogGenerator;
    use crate::image::PlaceholderCache;
    use crate::validate::validate;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[derive(Default)]
    struct CountingCache {
        rendered: RefCell<HashSet<String>>,
        renders: RefCell<usize>,
    }

    impl PlaceholderCache for CountingCache {
        fn ensure(&self, request: &PlaceholderRequest) -> Result<String> {
            if self.rendered.borrow_mut().insert(request.slug.clone()) {
                *self.renders.borrow_mut() += 1;
            }
            Ok(CatalogLayout::image_ref(&request.slug))
        }
    }

    fn generated(n: usize) -> (CatalogConfig, Catalog) {
        let config = CatalogConfig::default();
        let catalog = CatalogGenerator::new(&config).unwrap().generate(n);
        (config, catalog)
    }

    #[test]
    fn describe_handles_blank_brand() {
        assert_eq!(
            describe("Ridge Tee", "Urban Peak"),
            "The Ridge Tee from Urban Peak: premium apparel built for everyday adventure."
        );
        assert_eq!(
            describe("Ridge Tee", " "),
            "The Ridge Tee: premium apparel built for everyday adventure."
        );
    }

    #[test]
    fn casual_refresh_keeps_integrity_and_prefixes() {
        let (config, catalog) = generated(200);
        let cache = CountingCache::default();
        let mutator = CatalogMutator::new(&config, ImageResolver::new(&config, &cache));
        let before = validate(&catalog.items, &catalog.variations);
        let out = mutator
            .mutate(&catalog.items, &catalog.variations, Style::Casual)
            .unwrap();
        let after = validate(&out.items, &out.variations);
        assert_eq!(before, after);
        assert!(after.is_pass());

        let names: HashMap<&str, &Item> = out.items.iter().map(|i| (i.id.as_str(), i)).collect();
        for v in &out.variations {
            let parent = names[v.item_id.as_str()];
            assert!(v.item_name.starts_with(&parent.item_name));
            assert_eq!(v.image_url, parent.image_url);
        }
        for item in &out.items {
            assert_eq!(item.item_name, naming::name(&item.id, &item.brand, Style::Casual));
            let slug = slugify(&item.item_name, ITEM_SLUG_FALLBACK);
            assert_eq!(item.url, format!("https://aura-alpine.com/products/{slug}"));
            assert_eq!(item.image_url, format!("data/generated_images/{slug}.jpg"));
        }
    }

    #[test]
    fn mutation_preserves_keys_and_immutable_attributes() {
        let (config, catalog) = generated(50);
        let cache = CountingCache::default();
        let mutator = CatalogMutator::new(&config, ImageResolver::new(&config, &cache));
        let out = mutator
            .mutate(&catalog.items, &catalog.variations, Style::Premium)
            .unwrap();
        assert_eq!(out.items.len(), catalog.items.len());
        for (a, b) in catalog.items.iter().zip(&out.items) {
            assert_eq!((&a.id, &a.brand, &a.gender, a.price, &a.group_ids), (&b.id, &b.brand, &b.gender, b.price, &b.group_ids));
        }
        for (a, b) in catalog.variations.iter().zip(&out.variations) {
            assert_eq!(
                (&a.variation_id, &a.item_id, &a.color, &a.size, a.inventory),
                (&b.variation_id, &b.item_id, &b.color, &b.size, b.inventory)
            );
        }
    }

    #[test]
    fn mutation_is_idempotent_and_reuses_images() {
        let (config, catalog) = generated(100);
        let cache = CountingCache::default();
        let mutator = CatalogMutator::new(&config, ImageResolver::new(&config, &cache));
        let once = mutator
            .mutate(&catalog.items, &catalog.variations, Style::Brand)
            .unwrap();
        assert_ne!(once, catalog);
        let renders = *cache.renders.borrow();
        let twice = mutator.mutate(&once.items, &once.variations, Style::Brand).unwrap();
        assert_eq!(once, twice);
        assert_eq!(*cache.renders.borrow(), renders);
    }

    #[test]
    fn orphans_are_left_untouched() {
        let (config, mut catalog) = generated(3);
        let mut orphan = catalog.variations[0].clone();
        orphan.variation_id = "ZZ-99999-OCE-M".to_string();
        orphan.item_id = "ZZ-99999".to_string();
        catalog.variations.push(orphan.clone());

        let cache = CountingCache::default();
        let mutator = CatalogMutator::new(&config, ImageResolver::new(&config, &cache));
        let out = mutator
            .mutate(&catalog.items, &catalog.variations, Style::Adjective)
            .unwrap();
        assert_eq!(out.variations.last(), Some(&orphan));
        assert_eq!(validate(&out.items, &out.variations).orphan_variation_count, 1);
    }

    #[test]
    fn blank_attributes_degrade_variation_names() {
        let (config, mut catalog) = generated(1);
        catalog.variations[0].color.clear();
        catalog.variations[1].size.clear();
        catalog.variations[2].color.clear();
        catalog.variations[2].size.clear();
        let cache = CountingCache::default();
        let mutator = CatalogMutator::new(&config, ImageResolver::new(&config, &cache));
        let out = mutator
            .mutate(&catalog.items, &catalog.variations, Style::Casual)
            .unwrap();
        let parent = &out.items[0].item_name;
        assert_eq!(out.variations[0].item_name, format!("{parent} ({})", out.variations[0].size));
        assert_eq!(out.variations[1].item_name, format!("{parent} ({})", out.variations[1].color));
        assert_eq!(&out.variations[2].item_name, parent);
    }

    #[test]
    fn improve_names_leaves_images_and_urls() {
        let (config, catalog) = generated(20);
        let mutator = CatalogMutator::new(&config, ImageResolver::read_only(&config));
        let out = mutator.improve_names(&catalog.items, &catalog.variations);
        for (a, b) in catalog.items.iter().zip(&out.items) {
            assert_eq!(a.url, b.url);
            assert_eq!(a.image_url, b.image_url);
            assert_eq!(a.description, b.description);
            assert_eq!(b.item_name, Lexicon::trail().name(&b.id, &b.brand));
        }
        for (a, b) in catalog.variations.iter().zip(&out.variations) {
            assert_eq!(a.image_url, b.image_url);
            assert!(b.item_name.ends_with(&format!("({} / {})", b.color, b.size)));
        }
        assert_eq!(out, mutator.improve_names(&out.items, &out.variations));
    }

    #[test]
    fn localize_rewrites_only_external_placeholders() {
        let (config, mut catalog) = generated(2);
        catalog.variations[0].image_url = "https://images.unsplash.com/photo-1".to_string();
        catalog.variations[1].image_url = "https://images.unsplash.com/photo-2".to_string();
        let cache = CountingCache::default();
        let mutator = CatalogMutator::new(&config, ImageResolver::new(&config, &cache));
        let (out, changed) = mutator.localize_images(&catalog.variations).unwrap();
        assert_eq!(changed, 2);
        let v0 = &out[0];
        assert_eq!(
            v0.image_url,
            format!(
                "data/generated_images/{}.jpg",
                crate::slug::image_slug(&v0.item_id, &v0.color)
            )
        );
        assert_eq!(out[2..], catalog.variations[2..]);

        let (again, changed) = mutator.localize_images(&out).unwrap();
        assert_eq!(changed, 0);
        assert_eq!(again, out);
    }
}
