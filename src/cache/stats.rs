//! Cache Statistics Module
//!
//! Counters for client-side cache behavior: hits, misses, evictions and
//! explicit invalidations.

use serde::Serialize;

// == Cache Stats ==
/// Client-side cache counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Field reads served locally
    pub hits: u64,
    /// Field reads that had to go to the cache server
    pub misses: u64,
    /// Records evicted by the capacity bound
    pub evictions: u64,
    /// Records removed by an explicit delete
    pub invalidations: u64,
    /// Current number of cached records
    pub total_entries: usize,
}

impl CacheStats {
    /// Creates stats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
