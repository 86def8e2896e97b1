//! Skuforge catalog engine
//!
//! Synthesizes, restyles and checks a two-level product catalog: parent
//! items and their colour/size variations, stored as two delimited tables.
//!
//! ```text
//!   generate ──► items.csv + variations.csv ──► refresh / improve-names /
//!                        │                      localize-images (0..n times)
//!                        ▼
//!                validate ── search ── image resolution
//! ```
//!
//! ## Determinism
//!
//! Every value derived for an entity comes from a generator seeded by that
//! entity's identifier ([`seed`]). Passes share no random state, so they can
//! run in any order, any number of times, in separate processes, and still
//! agree with each other.

pub mod config;
pub mod error;
pub mod generate;
pub mod image;
pub mod model;
pub mod mutate;
pub mod naming;
pub mod palette;
pub mod search;
pub mod seed;
pub mod slug;
pub mod store;
pub mod table;
pub mod validate;

pub use config::{CatalogConfig, CatalogLayout, GeneratorConfig, RenderConfig};
pub use error::{CatalogError, Result};
pub use generate::{Catalog, CatalogGenerator};
pub use image::{ImageRef, ImageResolver, ImageSubject, PlaceholderCache, PlaceholderRequest};
pub use model::{Group, Item, Price, Row, Variation};
pub use mutate::CatalogMutator;
pub use naming::Style;
pub use palette::Swatch;
pub use search::{search, SearchQuery, Searchable};
pub use store::{CatalogStore, PassOutcome};
pub use validate::{validate, IntegrityReport};
