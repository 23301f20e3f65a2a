//! Catalog Hashing
//!
//! Deterministic SHA-256 fingerprints of normalized tileset data, used to
//! confirm that both schema generations of a tileset load to the same
//! catalog and that replays run against the tiles they were recorded with.

use sha2::{Sha256, Digest};
use super::fixed::Fixed;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher.
///
/// Wraps SHA-256 with helpers for fixed-width values.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a tileset catalog.
    pub fn for_catalog() -> Self {
        Self::new(b"TILESHAPE_CATALOG_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a Fixed value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.update_i32(value);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with an optional u32, tagging presence.
    #[inline]
    pub fn update_opt_u32(&mut self, value: Option<u32>) {
        match value {
            Some(v) => {
                self.update_u8(1);
                self.update_u32(v);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hasher_determinism() {
        let build = || {
            let mut h = StateHasher::for_catalog();
            h.update_u32(7);
            h.update_fixed(-42);
            h.update_bool(true);
            h.update_opt_u32(None);
            h.finalize()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_hasher_order_matters() {
        let mut a = StateHasher::for_catalog();
        a.update_u32(1);
        a.update_u32(2);

        let mut b = StateHasher::for_catalog();
        b.update_u32(2);
        b.update_u32(1);

        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_option_tagging_distinguishes_none_from_zero() {
        let mut a = StateHasher::for_catalog();
        a.update_opt_u32(None);
        let mut b = StateHasher::for_catalog();
        b.update_opt_u32(Some(0));
        assert_ne!(a.finalize(), b.finalize());
    }
}
