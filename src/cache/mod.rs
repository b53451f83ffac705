//! Cache Module
//!
//! Client-side caching: the cacheability policy, the bounded side cache
//! with LRU eviction, and the pool-backed client tying them together.

mod cacheable;
mod client;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use cacheable::{Cacheable, Command, ExactKeysCacheable, PrefixCacheable};
pub use client::{CscClient, EntityCache};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheRecord, SideCache};
