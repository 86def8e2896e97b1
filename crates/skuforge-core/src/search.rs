//! Case-insensitive substring search over generated text.
//!
//! A linear scan in table order; no ranking.

use crate::model::{Item, Variation};
use std::collections::BTreeSet;

/// Rows that expose searchable text.
pub trait Searchable {
    fn item_name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn brand(&self) -> Option<&str>;
}

impl Searchable for Item {
    fn item_name(&self) -> &str {
        &self.item_name
    }

    fn description(&self) -> Option<&str> {
        Some(&self.description)
    }

    fn brand(&self) -> Option<&str> {
        Some(&self.brand)
    }
}

impl Searchable for Variation {
    fn item_name(&self) -> &str {
        &self.item_name
    }

    fn description(&self) -> Option<&str> {
        None
    }

    fn brand(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Exact brand match, applied before the text match.
    pub brand: Option<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            brand: None,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }
}

/// Matching rows in table order. A blank query matches nothing; otherwise
/// the query is matched as typed, surrounding spaces included.
pub fn search<'a, T: Searchable>(records: &'a [T], query: &SearchQuery) -> Vec<&'a T> {
    if query.text.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.text.to_lowercase();
    records
        .iter()
        .filter(|r| match &query.brand {
            Some(brand) => r.brand() == Some(brand.as_str()),
            None => true,
        })
        .filter(|r| {
            contains(r.item_name(), &needle)
                || r.description().is_some_and(|d| contains(d, &needle))
        })
        .collect()
}

fn contains(field: &str, needle: &str) -> bool {
    !field.trim().is_empty() && field.to_lowercase().contains(needle)
}

/// Distinct non-blank brands, sorted.
pub fn brands(items: &[Item]) -> Vec<&str> {
    items
        .iter()
        .map(|i| i.brand.as_str())
        .filter(|b| !b.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
