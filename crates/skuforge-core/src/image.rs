//! Display-image resolution.
//!
//! First match wins:
//! 1. a stored, non-blank reference that is not an external placeholder;
//! 2. a locally rendered placeholder keyed by `slug(id)-slug(color)` when the
//!    stored reference points at an external placeholder host;
//! 3. a tag image built from the brand's first token;
//! 4. a tag image built from the first meaningful word of the name.
//!
//! Rasterization lives behind [`PlaceholderCache`]; this module only decides
//! what to ask for.

use crate::config::{CatalogConfig, CatalogLayout};
use crate::error::Result;
use crate::model::{Item, Variation};
use crate::palette::{self, Swatch};
use crate::slug::image_slug;

/// Words skipped when deriving a tag from a name.
pub const TAG_STOP_WORDS: &[&str] = &["a", "and", "&", "seasonal", "product", "the"];

/// Tag used when neither brand nor name yields one.
pub const DEFAULT_TAG: &str = "apparel";

/// A placeholder to rasterize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRequest {
    pub slug: String,
    pub label: String,
    pub background: Swatch,
}

/// Slug-keyed store of rendered placeholders.
pub trait PlaceholderCache {
    /// Root-relative reference for `request.slug`. Renders only when no
    /// image exists for the slug yet.
    fn ensure(&self, request: &PlaceholderRequest) -> Result<String>;
}

/// The row fields resolution looks at.
#[derive(Debug, Clone, Copy)]
pub struct ImageSubject<'a> {
    pub id: &'a str,
    pub image_url: &'a str,
    pub item_name: &'a str,
    pub brand: &'a str,
    pub color: &'a str,
}

impl<'a> From<&'a Item> for ImageSubject<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: &item.id,
            image_url: &item.image_url,
            item_name: &item.item_name,
            brand: &item.brand,
            color: "",
        }
    }
}

impl<'a> From<&'a Variation> for ImageSubject<'a> {
    fn from(v: &'a Variation) -> Self {
        Self {
            id: &v.item_id,
            image_url: &v.image_url,
            item_name: &v.item_name,
            brand: "",
            color: &v.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Stored(String),
    Rendered(String),
    Tagged { tag: String, url: String },
}

impl ImageRef {
    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Stored(s) | ImageRef::Rendered(s) => s,
            ImageRef::Tagged { url, .. } => url,
        }
    }
}

pub struct ImageResolver<'a> {
    config: &'a CatalogConfig,
    cache: Option<&'a dyn PlaceholderCache>,
}

impl<'a> ImageResolver<'a> {
    pub fn new(config: &'a CatalogConfig, cache: &'a dyn PlaceholderCache) -> Self {
        Self {
            config,
            cache: Some(cache),
        }
    }

    /// Resolver that never renders; rule 2 yields the reference the
    /// placeholder would be stored under.
    pub fn read_only(config: &'a CatalogConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    pub fn resolve(&self, subject: &ImageSubject<'_>) -> Result<ImageRef> {
        let stored = subject.image_url.trim();
        if !stored.is_empty() {
            if !self.config.is_external_placeholder(stored) {
                return Ok(ImageRef::Stored(stored.to_string()));
            }
            let color = subject.color.trim();
            let request = PlaceholderRequest {
                slug: image_slug(subject.id, color),
                label: if color.is_empty() {
                    subject.id.to_string()
                } else {
                    format!("{} {color}", subject.id)
                },
                background: palette::for_color_name(color),
            };
            return self.render(&request).map(ImageRef::Rendered);
        }

        let tag = fallback_tag(subject.brand, subject.item_name);
        Ok(ImageRef::Tagged {
            url: format!("{}{tag}", self.config.tag_image_base),
            tag,
        })
    }

    /// Placeholder for an explicit slug, rendered on first use.
    pub fn render(&self, request: &PlaceholderRequest) -> Result<String> {
        match self.cache {
            Some(cache) => cache.ensure(request),
            None => Ok(CatalogLayout::image_ref(&request.slug)),
        }
    }
}

/// Brand's first token, else the first non-stop word of the name, else
/// [`DEFAULT_TAG`].
pub fn fallback_tag(brand: &str, item_name: &str) -> String {
    if let Some(token) = brand.split_whitespace().next() {
        return token.to_string();
    }
    item_name
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c == ',' || c == '&'))
        .find(|w| !w.is_empty() && !TAG_STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_TAG.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingCache {
        requests: RefCell<Vec<PlaceholderRequest>>,
    }

    impl PlaceholderCache for RecordingCache {
        fn ensure(&self, request: &PlaceholderRequest) -> Result<String> {
            self.requests.borrow_mut().push(request.clone());
            Ok(CatalogLayout::image_ref(&request.slug))
        }
    }

    fn subject<'a>(image_url: &'a str, brand: &'a str, name: &'a str, color: &'a str) -> ImageSubject<'a> {
        ImageSubject {
            id: "AA-10001",
            image_url,
            item_name: name,
            brand,
            color,
        }
    }

    #[test]
    fn stored_reference_wins() {
        let config = CatalogConfig::default();
        let cache = RecordingCache::default();
        let resolver = ImageResolver::new(&config, &cache);
        let got = resolver
            .resolve(&subject("https://cdn.example/x.jpg", "Urban Peak", "Ridge Tee", ""))
            .unwrap();
        assert_eq!(got, ImageRef::Stored("https://cdn.example/x.jpg".to_string()));
        assert!(cache.requests.borrow().is_empty());
    }

    #[test]
    fn external_placeholder_is_rendered_locally() {
        let config = CatalogConfig::default();
        let cache = RecordingCache::default();
        let resolver = ImageResolver::new(&config, &cache);
        let got = resolver
            .resolve(&subject("https://images.unsplash.com/p1", "", "Ridge Tee", "Ocean Blue"))
            .unwrap();
        assert_eq!(
            got,
            ImageRef::Rendered("data/generated_images/aa-10001-ocean-blue.jpg".to_string())
        );
        let requests = cache.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].label, "AA-10001 Ocean Blue");
        assert_eq!(requests[0].background, palette::for_color_name("Ocean Blue"));
    }

    #[test]
    fn blank_color_labels_with_id_and_gray() {
        let config = CatalogConfig::default();
        let cache = RecordingCache::default();
        ImageResolver::new(&config, &cache)
            .resolve(&subject("https://images.unsplash.com/p1", "", "", " "))
            .unwrap();
        let requests = cache.requests.borrow();
        assert_eq!(requests[0].label, "AA-10001");
        assert_eq!(requests[0].slug, "aa-10001-x");
        assert_eq!(requests[0].background, Swatch::NEUTRAL_GRAY);
    }

    #[test]
    fn read_only_resolver_reports_the_cache_path() {
        let config = CatalogConfig::default();
        let got = ImageResolver::read_only(&config)
            .resolve(&subject("https://images.unsplash.com/p1", "", "", "Sandstone"))
            .unwrap();
        assert_eq!(got.as_str(), "data/generated_images/aa-10001-sandstone.jpg");
    }

    #[test]
    fn blank_reference_falls_back_to_tags() {
        let config = CatalogConfig::default();
        let resolver = ImageResolver::read_only(&config);
        let by_brand = resolver.resolve(&subject("", "Aura & Alpine", "Ridge Tee", "")).unwrap();
        assert_eq!(
            by_brand,
            ImageRef::Tagged {
                tag: "Aura".to_string(),
                url: "https://loremflickr.com/320/240/apparel,outdoor,Aura".to_string(),
            }
        );
        let by_name = resolver
            .resolve(&subject(" ", "", "The Seasonal Product Cargo Pants", ""))
            .unwrap();
        assert_eq!(by_name.as_str(), "https://loremflickr.com/320/240/apparel,outdoor,Cargo");
    }

    #[test]
    fn fallback_tag_defaults() {
        assert_eq!(fallback_tag("", "the & a"), DEFAULT_TAG);
        assert_eq!(fallback_tag("", ""), DEFAULT_TAG);
        assert_eq!(fallback_tag("  ", "Harbor, Vest"), "Harbor");
    }
}
