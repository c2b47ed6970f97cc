//! Engine counters.

use std::fmt;

/// Running counters for cache and propagation activity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// `get` calls answered from the cache.
    pub hits: u64,
    /// `get` calls that had to compute.
    pub misses: u64,
    /// Provider computations, forced or not.
    pub computations: u64,
    /// Cache entries removed.
    pub evictions: u64,
    /// `(upstream, downstream)` pairs dispatched.
    pub notifications: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} computations={} evictions={} notifications={}",
            self.hits, self.misses, self.computations, self.evictions, self.notifications
        )
    }
}
