//! Deterministic product names.
//!
//! A name is a pure function of `(id, brand, lexicon)`: the generator is
//! rebuilt from the id on every call, so separate passes (and separate
//! processes) agree on every name without sharing any state.

use crate::seed::{entity_rng, EntityRng, Stream};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token used by the `brand` style when the brand field is blank.
pub const FALLBACK_BRAND_TOKEN: &str = "Aura";

pub const LANDSCAPE_WORDS: &[&str] = &[
    "Summit", "Harbor", "Cascade", "Ridge", "Trail", "Echo", "Aurora", "North", "Coast", "Prairie",
    "Ember", "Willow", "Stone", "River", "Cinder", "Pioneer", "Atlas", "Horizon", "Canyon", "Meadow",
];

pub const TRAIL_WORDS: &[&str] = &[
    "Summit", "Harbor", "Cascade", "Ridge", "Trail", "Echo", "Aurora", "North", "Coast", "Prairie",
    "Ember", "Willow", "Stone", "River", "Cinder", "Pioneer", "Atlas", "Horizon", "Canyon", "Meadow",
    "Boulder", "Glacier", "Solace", "Fjord", "Peak", "Timber", "Drift", "Cove", "Sage", "Mariner",
];

pub const GARMENTS: &[&str] = &[
    "Shirt", "Tee", "Polo", "Tank", "Jacket", "Hoodie", "Sweater", "Chino", "Cargo Pants", "Pants",
    "Shorts", "Cap", "Beanie", "Skort", "Dress", "Leggings", "Joggers", "Blouse", "Cardigan", "Vest",
];

pub const CASUAL_WORDS: &[&str] = &[
    "Cozy", "Easy", "Daily", "Street", "Fresh", "Urban", "Comfy", "Breezy",
];

pub const PREMIUM_WORDS: &[&str] = &[
    "Heritage", "Lux", "Reserve", "Signature", "Elite", "Foundry", "Classic", "Merino",
];

/// Naming style selectable on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Brand,
    Adjective,
    Casual,
    Premium,
}

impl Style {
    pub const ALL: [Style; 4] = [Style::Brand, Style::Adjective, Style::Casual, Style::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Brand => "brand",
            Style::Adjective => "adjective",
            Style::Casual => "casual",
            Style::Premium => "premium",
        }
    }

    pub fn lexicon(self) -> Lexicon {
        match self {
            Style::Brand => Lexicon {
                lead: Lead::BrandToken,
                descriptors: LANDSCAPE_WORDS,
                nouns: GARMENTS,
                compound_probability: 0.20,
            },
            Style::Adjective => Lexicon::descriptive(LANDSCAPE_WORDS, 0.15),
            Style::Casual => Lexicon::descriptive(CASUAL_WORDS, 0.15),
            Style::Premium => Lexicon::descriptive(PREMIUM_WORDS, 0.15),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style `{0}` (expected brand, adjective, casual or premium)")]
pub struct ParseStyleError(String);

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStyleError(s.to_string()))
    }
}

/// Where the first word of a name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    /// First token of the brand field.
    BrandToken,
    /// A word drawn from the descriptor pool.
    Descriptor,
}

/// Word pools plus composition rules.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    pub lead: Lead,
    pub descriptors: &'static [&'static str],
    pub nouns: &'static [&'static str],
    /// Chance of a three-word name with a second descriptor.
    pub compound_probability: f64,
}

impl Lexicon {
    const fn descriptive(descriptors: &'static [&'static str], compound_probability: f64) -> Self {
        Self {
            lead: Lead::Descriptor,
            descriptors,
            nouns: GARMENTS,
            compound_probability,
        }
    }

    /// Lexicon of the name-improvement pass ("Summit Ridge Shirt").
    pub const fn trail() -> Self {
        Self::descriptive(TRAIL_WORDS, 0.15)
    }

    /// Compose the name for `id`.
    pub fn name(&self, id: &str, brand: &str) -> String {
        let mut rng = entity_rng(id, Stream::NAMING);
        let (lead, lead_index) = match self.lead {
            Lead::BrandToken => (brand_token(brand).to_string(), None),
            Lead::Descriptor => {
                let index = rng.random_range(0..self.descriptors.len());
                (self.descriptors[index].to_string(), Some(index))
            }
        };
        let noun = pick(&mut rng, self.nouns);

        if rng.random_bool(self.compound_probability) {
            let extra = pick_other(&mut rng, self.descriptors, lead_index);
            format!("{lead} {extra} {noun}")
        } else {
            format!("{lead} {noun}")
        }
    }
}

/// Name for `id` under `style`.
pub fn name(id: &str, brand: &str, style: Style) -> String {
    style.lexicon().name(id, brand)
}

/// First whitespace token of `brand`, or [`FALLBACK_BRAND_TOKEN`].
pub fn brand_token(brand: &str) -> &str {
    brand.split_whitespace().next().unwrap_or(FALLBACK_BRAND_TOKEN)
}

fn pick<'a>(rng: &mut EntityRng, pool: &[&'a str]) -> &'a str {
    pool[rng.random_range(0..pool.len())]
}

// Second descriptor never repeats the lead word.
fn pick_other<'a>(rng: &mut EntityRng, pool: &[&'a str], skip: Option<usize>) -> &'a str {
    match skip {
        Some(skip) if pool.len() > 1 => {
            let mut index = rng.random_range(0..pool.len() - 1);
            if index >= skip {
                index += 1;
            }
            pool[index]
        }
        _ => pick(rng, pool),
    }
}
