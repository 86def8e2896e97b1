//! Seed derivation and per-entity generators.
//!
//! Every randomized decision about an entity is drawn from a generator built
//! fresh from that entity's identifier. Nothing here touches process-wide
//! random state, so reordering or interleaving entities never changes what
//! any one of them gets.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Hash-derived seeds are reduced into `0..HASH_SEED_RANGE`.
pub const HASH_SEED_RANGE: u64 = 100_000;

/// Generator type handed to every per-entity decision.
pub type EntityRng = ChaCha8Rng;

/// Independent decision streams for one entity.
///
/// `NAMING` is the identity stream: it seeds straight from [`seed`], which
/// keeps names a function of the id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stream(u64);

impl Stream {
    pub const NAMING: Stream = Stream(0);
    pub const PALETTE: Stream = Stream(0xbb67_ae85_84ca_a73b);

    /// Attribute draws at generation time, salted by the catalog seed.
    pub const fn generation(catalog_seed: u64) -> Stream {
        Stream(0x6a09_e667_f3bc_c908 ^ catalog_seed)
    }
}

/// Map an identifier to a stable numeric seed.
///
/// Uses the trailing run of digits in `id` (`AA-10001` -> 10001, and also
/// `AA-10001-MID-XS` -> 10001). Identifiers without digits, or whose digits
/// overflow a `u64`, fall back to a SHA-256 of the full string reduced into
/// `0..HASH_SEED_RANGE`.
pub fn seed(id: &str) -> u64 {
    numeric_suffix(id).unwrap_or_else(|| stable_hash(id) % HASH_SEED_RANGE)
}

/// Fresh generator for one entity and one decision stream.
pub fn entity_rng(id: &str, stream: Stream) -> EntityRng {
    ChaCha8Rng::seed_from_u64(mix(seed(id), stream.0))
}

fn numeric_suffix(id: &str) -> Option<u64> {
    let trimmed = id.trim_end_matches(|c: char| !c.is_ascii_digit());
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    trimmed[start..].parse().ok()
}

fn stable_hash(id: &str) -> u64 {
    let digest = Sha256::digest(id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

fn mix(seed: u64, stream: u64) -> u64 {
    if stream == 0 {
        return seed;
    }
    splitmix64(seed ^ splitmix64(stream))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::Rng;

    #[test]
    fn numeric_ids_use_their_suffix() {
        assert_eq!(seed("AA-10001"), 10001);
        assert_eq!(seed("AA-15000"), 15000);
        assert_eq!(seed("AA-10001-MID-XS"), 10001);
        assert_eq!(seed("SKU7"), 7);
    }

    #[test]
    fn hash_fallback_is_pinned() {
        // Pinned values guard against the fallback drifting between builds.
        assert_eq!(seed("alpha"), 22974);
        assert_eq!(seed("AA-XYZ"), 98257);
        assert_eq!(seed(""), 61652);
    }

    #[test]
    fn overflowing_digits_fall_back_to_hash() {
        let id = "X-99999999999999999999999";
        assert!(seed(id) < HASH_SEED_RANGE);
    }

    #[test]
    fn streams_are_independent() {
        let a: u64 = entity_rng("AA-10001", Stream::NAMING).random();
        let b: u64 = entity_rng("AA-10001", Stream::PALETTE).random();
        let c: u64 = entity_rng("AA-10001", Stream::generation(0)).random();
        let d: u64 = entity_rng("AA-10001", Stream::generation(1)).random();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(c, d);
    }

    #[test]
    fn interleaving_does_not_change_draws() {
        let mut first = entity_rng("AA-10001", Stream::NAMING);
        let mut other = entity_rng("AA-10002", Stream::NAMING);
        let _: u32 = other.random();
        let x: u32 = first.random();
        let y: u32 = entity_rng("AA-10001", Stream::NAMING).random();
        assert_eq!(x, y);
    }

    proptest! {
        #[test]
        fn seed_is_pure(id in ".{0,24}") {
            prop_assert_eq!(seed(&id), seed(&id.clone()));
        }

        #[test]
        fn rng_is_reproducible(id in "[A-Z]{2}-[0-9]{1,6}|[a-z ]{1,12}") {
            let a: u64 = entity_rng(&id, Stream::NAMING).random();
            let b: u64 = entity_rng(&id, Stream::NAMING).random();
            prop_assert_eq!(a, b);
        }
    }
}
