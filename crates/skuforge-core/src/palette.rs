//! Background colours for placeholder images.

use crate::seed::{entity_rng, Stream};
use rand::Rng;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swatch(pub [u8; 3]);

impl Swatch {
    pub const NEUTRAL_GRAY: Swatch = Swatch([0x88, 0x88, 0x88]);
    pub const WHITE: Swatch = Swatch([0xff, 0xff, 0xff]);
    pub const BLACK: Swatch = Swatch([0x00, 0x00, 0x00]);

    pub const fn hex(rgb: u32) -> Swatch {
        Swatch([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8])
    }

    /// Colour used for text drawn on top of this background.
    pub fn ink(self) -> Swatch {
        let [r, g, b] = self.0;
        // Rec. 601 luma.
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
        if luma > 200 {
            Swatch::BLACK
        } else {
            Swatch::WHITE
        }
    }
}

const NAMED: &[(&str, u32)] = &[
    ("black", 0x111111),
    ("navy", 0x0b3d91),
    ("midnight black", 0x0b0b0b),
    ("midnight", 0x0b0b0b),
    ("grey", 0x9ea7ad),
    ("light grey", 0xd6d8da),
    ("slate grey", 0x7b8a93),
    ("charcoal", 0x333333),
    ("olive", 0x708238),
    ("khaki", 0xbdb07a),
    ("tan", 0xd2b48c),
    ("sandstone", 0xd6c6a6),
    ("arctic white", 0xf6f7f8),
    ("white", 0xffffff),
    ("ocean blue", 0x0e6ea8),
    ("ocean", 0x0e6ea8),
    ("indigo", 0x26466d),
    ("rose", 0xe29aa6),
    ("maroon", 0x6b0f0f),
    ("platinum", 0xe5e7eb),
    ("pink", 0xf3b0c3),
    ("pastel", 0xd8e8e8),
    ("natural", 0xf0e6d6),
    ("forest green", 0x2e5339),
];

/// Palette for slug images, which have no colour attribute of their own.
pub const PALETTE: [Swatch; 9] = [
    Swatch::hex(0x0e6ea8),
    Swatch::hex(0xbdb07a),
    Swatch::hex(0xd6c6a6),
    Swatch::hex(0x6b0f0f),
    Swatch::hex(0x111111),
    Swatch::hex(0xf6f7f8),
    Swatch::hex(0x7b8a93),
    Swatch::hex(0xe29aa6),
    Swatch::hex(0x26466d),
];

/// Look up a colour name; unmapped or blank names are neutral gray.
pub fn for_color_name(name: &str) -> Swatch {
    let key = name.trim().to_lowercase();
    NAMED
        .iter()
        .find(|(n, _)| *n == key)
        .map(|(_, rgb)| Swatch::hex(*rgb))
        .unwrap_or(Swatch::NEUTRAL_GRAY)
}

/// Deterministic palette entry for an entity.
pub fn for_entity(id: &str) -> Swatch {
    let mut rng = entity_rng(id, Stream::PALETTE);
    PALETTE[rng.random_range(0..PALETTE.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup_is_case_insensitive() {
        assert_eq!(for_color_name(" Ocean Blue "), Swatch::hex(0x0e6ea8));
        assert_eq!(for_color_name("SANDSTONE"), Swatch::hex(0xd6c6a6));
    }

    #[test]
    fn unmapped_names_are_gray() {
        assert_eq!(for_color_name("Chartreuse"), Swatch::NEUTRAL_GRAY);
        assert_eq!(for_color_name(""), Swatch::NEUTRAL_GRAY);
    }

    #[test]
    fn ink_contrasts_with_background() {
        assert_eq!(for_color_name("Arctic White").ink(), Swatch::BLACK);
        assert_eq!(for_color_name("white").ink(), Swatch::BLACK);
        assert_eq!(for_color_name("Midnight Black").ink(), Swatch::WHITE);
        assert_eq!(Swatch::NEUTRAL_GRAY.ink(), Swatch::WHITE);
    }

    #[test]
    fn entity_palette_is_stable() {
        assert_eq!(for_entity("AA-10042"), for_entity("AA-10042"));
        assert!(PALETTE.contains(&for_entity("AA-10042")));
    }
}
