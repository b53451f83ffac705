//! Side Cache Module
//!
//! The bounded client-side store: key -> field map, capacity-bounded with
//! LRU eviction. Exclusively owns its records; the backing store always
//! remains the source of truth.

use std::collections::HashMap;

use crate::cache::{CacheStats, LruTracker};

/// Field name -> field value projection of one cached entity.
pub type CacheRecord = HashMap<String, String>;

// == Side Cache ==
/// Fixed-capacity store of cache key -> field map.
///
/// Inserting a new key at capacity evicts exactly one record, the least
/// recently used. Field reads and writes both count as use.
#[derive(Debug)]
pub struct SideCache {
    records: HashMap<String, CacheRecord>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
}

impl SideCache {
    /// Creates a cache holding at most `max_entries` records.
    pub fn new(max_entries: usize) -> Self {
        Self {
            records: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Exists ==
    /// Whether a record is present. Does not count toward hit/miss stats
    /// and does not refresh recency.
    pub fn exists(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    // == Get Field ==
    /// Reads one field of a record, refreshing its recency on hit.
    pub fn get_field(&mut self, key: &str, field: &str) -> Option<String> {
        let value = self
            .records
            .get(key)
            .and_then(|record| record.get(field))
            .cloned();

        if value.is_some() {
            self.stats.record_hit();
            self.lru.touch(key);
        } else {
            self.stats.record_miss();
        }
        value
    }

    // == Set Field ==
    /// Inserts or overwrites one field, creating the record if absent.
    ///
    /// When the insert would exceed capacity, the least recently used
    /// record is evicted first.
    pub fn set_field(&mut self, key: &str, field: &str, value: impl Into<String>) {
        if !self.records.contains_key(key) && self.records.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.records.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        self.records
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
        self.lru.touch(key);
        self.stats.set_total_entries(self.records.len());
    }

    // == Delete ==
    /// Removes a record. No-op if absent.
    pub fn delete(&mut self, key: &str) {
        if self.records.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.record_invalidation();
            self.stats.set_total_entries(self.records.len());
        }
    }

    // == Stats ==
    /// Snapshot of the current counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.records.len());
        stats
    }

    /// Current number of cached records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are cached.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
