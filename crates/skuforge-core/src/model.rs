//! Typed rows for the two catalog tables.
//!
//! Column names follow the downstream indexing format (`metadata:` prefix on
//! attribute columns). Readers also accept the bare attribute names so that
//! hand-edited files still load.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ITEM_COLUMNS: [&str; 9] = [
    "id",
    "item_name",
    "image_url",
    "url",
    "description",
    "group_ids",
    "metadata:price",
    "metadata:brand",
    "metadata:gender",
];

pub const VARIATION_COLUMNS: [&str; 7] = [
    "variation_id",
    "item_id",
    "item_name",
    "image_url",
    "metadata:color",
    "metadata:size",
    "metadata:inventory",
];

/// A table row type and the header its table is written with.
pub trait Row {
    const COLUMNS: &'static [&'static str];
}

impl Row for Item {
    const COLUMNS: &'static [&'static str] = &ITEM_COLUMNS;
}

impl Row for Variation {
    const COLUMNS: &'static [&'static str] = &VARIATION_COLUMNS;
}

/// Parent product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub item_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group_ids: String,
    #[serde(rename = "metadata:price", alias = "price")]
    pub price: Price,
    #[serde(rename = "metadata:brand", alias = "brand", default)]
    pub brand: String,
    #[serde(rename = "metadata:gender", alias = "gender", default)]
    pub gender: String,
}

/// Child SKU row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub variation_id: String,
    pub item_id: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(rename = "metadata:color", alias = "color", default)]
    pub color: String,
    #[serde(rename = "metadata:size", alias = "size", default)]
    pub size: String,
    /// Signed so that a negative count in a hand-edited file reaches the
    /// validator instead of failing the read.
    #[serde(rename = "metadata:inventory", alias = "inventory")]
    pub inventory: i64,
}

impl Variation {
    /// Rebuild the display name from a parent name.
    ///
    /// Blank attributes drop out of the parenthetical; with both blank the
    /// result is the bare parent name.
    pub fn display_name(parent_name: &str, color: &str, size: &str) -> String {
        let color = color.trim();
        let size = size.trim();
        match (color.is_empty(), size.is_empty()) {
            (false, false) => format!("{parent_name} ({color} / {size})"),
            (false, true) => format!("{parent_name} ({color})"),
            (true, false) => format!("{parent_name} ({size})"),
            (true, true) => parent_name.to_string(),
        }
    }
}

// ============================================================================
// Price
// ============================================================================

/// Currency amount held as integer cents, written as `<units>.<cc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(i64);

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid price `{0}`")]
pub struct ParsePriceError(String);

impl FromStr for Price {
    type Err = ParsePriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ParsePriceError(s.to_string()))?;
        if !value.is_finite() {
            return Err(ParsePriceError(s.to_string()));
        }
        Ok(Self((value * 100.0).round() as i64))
    }
}

impl TryFrom<String> for Price {
    type Error = ParsePriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.to_string()
    }
}

// ============================================================================
// Group
// ============================================================================

/// Category assignment, a pure function of gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Mens,
    Womens,
    Accessories,
}

impl Group {
    pub fn for_gender(gender: &str) -> Self {
        match gender.trim() {
            "Men" => Self::Mens,
            "Women" => Self::Womens,
            _ => Self::Accessories,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mens => "mens",
            Self::Womens => "womens",
            Self::Accessories => "accessories",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
