//! Relational integrity checks over both tables.
//!
//! Read-only and linear: every check is a single pass with set membership.
//! Problems are counted and listed, never repaired.

use crate::model::{Item, Variation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inclusive price bounds checked by [`validate`], in cents.
pub const PRICE_BOUNDS_CENTS: (i64, i64) = (1500, 25000);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub item_count: usize,
    pub variation_count: usize,
    /// Item rows repeating an id seen earlier in the table.
    pub duplicate_parent_ids: usize,
    /// Variation rows whose `item_id` matches no item.
    pub orphan_variation_count: usize,
    /// Variation rows repeating a `variation_id` seen earlier.
    pub duplicate_variation_ids: usize,
    /// Variation rows repeating a (colour, size) pair already used under the same item.
    pub duplicate_option_pairs: usize,
    pub out_of_range_prices: usize,
    pub negative_inventory: usize,
    pub diagnostics: Diagnostics,
}

/// Offending keys, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub duplicate_parent_ids: Vec<String>,
    pub orphan_variations: Vec<String>,
    pub duplicate_variation_ids: Vec<String>,
    pub duplicate_option_pairs: Vec<String>,
    pub out_of_range_prices: Vec<String>,
    pub negative_inventory: Vec<String>,
}

impl IntegrityReport {
    fn counts(&self) -> [(&'static str, usize); 6] {
        [
            ("duplicate parent ids", self.duplicate_parent_ids),
            ("orphan variations", self.orphan_variation_count),
            ("duplicate variation ids", self.duplicate_variation_ids),
            ("duplicate colour/size pairs", self.duplicate_option_pairs),
            ("prices out of range", self.out_of_range_prices),
            ("negative inventory", self.negative_inventory),
        ]
    }

    /// Each check with its count, for summaries.
    pub fn checks(&self) -> impl Iterator<Item = (&'static str, usize)> {
        self.counts().into_iter()
    }

    /// Number of checks with a nonzero count.
    pub fn failed_checks(&self) -> usize {
        self.checks().filter(|(_, n)| *n > 0).count()
    }

    pub fn is_pass(&self) -> bool {
        self.failed_checks() == 0
    }

    /// Checks whose count grew relative to `before`.
    pub fn regressions_since(&self, before: &IntegrityReport) -> Vec<&'static str> {
        self.counts()
            .into_iter()
            .zip(before.counts())
            .filter(|((_, now), (_, was))| now > was)
            .map(|((name, _), _)| name)
            .collect()
    }
}

/// Check both tables.
pub fn validate(items: &[Item], variations: &[Variation]) -> IntegrityReport {
    let mut report = IntegrityReport {
        item_count: items.len(),
        variation_count: variations.len(),
        ..IntegrityReport::default()
    };
    let d = &mut report.diagnostics;

    let mut item_ids: HashSet<&str> = HashSet::with_capacity(items.len());
    for item in items {
        if !item_ids.insert(item.id.as_str()) {
            d.duplicate_parent_ids.push(item.id.clone());
        }
        let cents = item.price.cents();
        if cents < PRICE_BOUNDS_CENTS.0 || cents > PRICE_BOUNDS_CENTS.1 {
            d.out_of_range_prices.push(item.id.clone());
        }
    }

    let mut variation_ids: HashSet<&str> = HashSet::with_capacity(variations.len());
    let mut option_pairs: HashSet<(&str, &str, &str)> = HashSet::with_capacity(variations.len());
    for v in variations {
        if !item_ids.contains(v.item_id.as_str()) {
            d.orphan_variations.push(v.variation_id.clone());
        }
        if !variation_ids.insert(v.variation_id.as_str()) {
            d.duplicate_variation_ids.push(v.variation_id.clone());
        }
        if !option_pairs.insert((v.item_id.as_str(), v.color.trim(), v.size.trim())) {
            d.duplicate_option_pairs.push(v.variation_id.clone());
        }
        if v.inventory < 0 {
            d.negative_inventory.push(v.variation_id.clone());
        }
    }

    report.duplicate_parent_ids = d.duplicate_parent_ids.len();
    report.orphan_variation_count = d.orphan_variations.len();
    report.duplicate_variation_ids = d.duplicate_variation_ids.len();
    report.duplicate_option_pairs = d.duplicate_option_pairs.len();
    report.out_of_range_prices = d.out_of_range_prices.len();
    report.negative_inventory = d.negative_inventory.len();

    tracing::debug!(
        items = report.item_count,
        variations = report.variation_count,
        failed_checks = report.failed_checks(),
        "validated catalog"
    );
    report
}
