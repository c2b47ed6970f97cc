//! Change-hash memoization for downstream notification.

use std::collections::HashMap;

use weave_common::{ContentHash, MetadataId};

/// Remembers the hash of the last item announced for each MID.
///
/// A recomputation whose hash matches the remembered one is not announced,
/// which stops cascades when nothing observable changed.
#[derive(Debug, Default)]
pub struct HashTracker {
    hashes: HashMap<MetadataId, ContentHash>,
}

impl HashTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `hash` for `mid` and returns `true` if downstream dependents
    /// should be notified (first sighting or a different hash).
    pub fn record(&mut self, mid: &MetadataId, hash: ContentHash) -> bool {
        match self.hashes.insert(mid.clone(), hash) {
            Some(previous) => previous != hash,
            None => true,
        }
    }

    /// Returns the last recorded hash for `mid`.
    pub fn last(&self, mid: &MetadataId) -> Option<ContentHash> {
        self.hashes.get(mid).copied()
    }

    /// Forgets `mid`, so its next computation is announced.
    pub fn forget(&mut self, mid: &MetadataId) -> bool {
        self.hashes.remove(mid).is_some()
    }

    /// Forgets every MID.
    pub fn clear(&mut self) {
        self.hashes.clear();
    }

    /// Number of MIDs tracked.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Returns `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}
