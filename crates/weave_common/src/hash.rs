//! Content hashing for change detection and notification suppression.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit content hash computed using XXH3.
///
/// Two items with the same `ContentHash` are assumed to have identical
/// content. The engine compares hashes of recomputed metadata to decide
/// whether downstream dependents need to hear about a change.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Streaming builder for a [`ContentHash`] over several fields.
///
/// Each field is length-prefixed so that `("ab", "c")` and `("a", "bc")`
/// hash differently.
pub struct ContentHasher {
    state: Xxh3,
}

impl ContentHasher {
    /// Creates an empty hasher.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Feeds one length-prefixed field into the hash.
    pub fn field(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(&(data.len() as u64).to_le_bytes());
        self.state.update(data);
        self
    }

    /// Feeds a boolean flag into the hash.
    pub fn flag(&mut self, value: bool) -> &mut Self {
        self.state.update(&[u8::from(value)]);
        self
    }

    /// Returns the hash of everything fed so far.
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.state.digest128().to_le_bytes())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(data: &[u8]) -> ContentHash {
        ContentHasher::new().field(data).finish()
    }

    #[test]
    fn deterministic() {
        let a = hash(b"hello world");
        let b = hash(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = hash(b"hello");
        let b = hash(b"world");
        assert_ne!(a, b);
    }

    #[test]
    fn display_format() {
        let h = hash(b"test");
        let s = format!("{h}");
        assert_eq!(s.len(), 32, "Display should be 32 hex chars");
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_abbreviated() {
        let h = hash(b"test");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with(")"));
    }

    #[test]
    fn hasher_fields_are_length_prefixed() {
        let a = ContentHasher::new().field(b"ab").field(b"c").finish();
        let b = ContentHasher::new().field(b"a").field(b"bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn hasher_flag_changes_hash() {
        let valid = ContentHasher::new().flag(true).field(b"body").finish();
        let invalid = ContentHasher::new().flag(false).field(b"body").finish();
        assert_ne!(valid, invalid);
    }

    #[test]
    fn hasher_is_repeatable() {
        let a = ContentHasher::new().flag(true).field(b"x").finish();
        let b = ContentHasher::new().flag(true).field(b"x").finish();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_roundtrip() {
        let h = hash(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
