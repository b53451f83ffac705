//! Person Service
//!
//! The read-through cache manager. Orchestrates reads and writes between
//! the backing store and the cache client: reads consult the cache first
//! and populate it on miss, writes go to the store first and then update
//! the cache, deletes invalidate unconditionally. Cache failures degrade
//! to store access and never fail a request.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{Command, EntityCache};
use crate::error::{CacheResult, StoreResult};
use crate::models::Person;
use crate::repository::PersonRepository;

/// Cached field names for a person record.
const FIELD_NAME: &str = "name";
const FIELD_SURNAME: &str = "surname";

/// Derives the cache key for a person id. Deterministic and unique per
/// entity instance.
pub fn cache_key(id: u64) -> String {
    format!("person:{}", id)
}

// == Person Service ==
/// CRUD service over the backing store with a selective read-through
/// cache. Holds no mutable state of its own.
pub struct PersonService {
    repository: Arc<dyn PersonRepository>,
    cache: Arc<dyn EntityCache>,
}

impl PersonService {
    pub fn new(repository: Arc<dyn PersonRepository>, cache: Arc<dyn EntityCache>) -> Self {
        Self { repository, cache }
    }

    // == Find All ==
    /// Lists all persons straight from the backing store. Multi-entity
    /// results are not cached.
    pub async fn find_all(&self) -> StoreResult<Vec<Person>> {
        info!("Fetching all persons from the backing store");
        self.repository.find_all().await
    }

    // == Find By Id ==
    /// Read-through lookup.
    ///
    /// Keys outside the cacheability policy skip the cache entirely. A
    /// cache hit answers without touching the backing store; a miss reads
    /// the store and populates the cache best-effort. NotFound results are
    /// never cached.
    pub async fn find_by_id(&self, id: u64) -> StoreResult<Person> {
        let key = cache_key(id);

        if !self.cache.is_cacheable(Command::HGet, &[key.as_str()]) {
            debug!(id, "key not cacheable, reading backing store directly");
            return self.repository.find_by_id(id).await;
        }

        match self.read_cached(&key, id).await {
            Ok(Some(person)) => {
                info!(id, "Fetching person from cache");
                return Ok(person);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(id, error = %err, "Cache read failed, falling back to backing store");
            }
        }

        info!(id, "Fetching person from the backing store");
        let person = self.repository.find_by_id(id).await?;

        // Population is best-effort; a failing cache never fails the read.
        if let Err(err) = self.write_fields(&key, &person).await {
            warn!(id, error = %err, "Caching person failed");
        } else {
            debug!(id, "Cached person");
        }
        Ok(person)
    }

    // == Save ==
    /// Creates or updates a person.
    ///
    /// Persists to the backing store first; only a successful save reaches
    /// the cache. The cached fields are then overwritten (write-through),
    /// and any cache failure is logged and swallowed.
    pub async fn save(&self, person: Person) -> StoreResult<Person> {
        let saved = self.repository.save(person).await?;

        if let Some(id) = saved.id {
            let key = cache_key(id);
            if self.cache.is_cacheable(Command::HGet, &[key.as_str()]) {
                match self.write_fields(&key, &saved).await {
                    Ok(()) => info!(id, "Caching person"),
                    Err(err) => warn!(id, error = %err, "Write-through to cache failed"),
                }
            }
        }
        Ok(saved)
    }

    // == Delete ==
    /// Deletes a person.
    ///
    /// The backing-store delete must succeed before the cache is touched;
    /// the cache delete then runs unconditionally so no stale entry can
    /// survive, and its failure is logged and swallowed.
    pub async fn delete_by_id(&self, id: u64) -> StoreResult<()> {
        info!(id, "Deleting person");
        self.repository.delete_by_id(id).await?;

        let key = cache_key(id);
        match self.cache.del(&key).await {
            Ok(()) => info!(id, "Removed person from cache"),
            Err(err) => warn!(id, error = %err, "Cache invalidation failed"),
        }
        Ok(())
    }

    /// Snapshot of the client-side cache counters, for the health surface.
    pub async fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats().await
    }

    /// Rebuilds a person from cached fields. A missing or partial record
    /// counts as a miss.
    async fn read_cached(&self, key: &str, id: u64) -> CacheResult<Option<Person>> {
        if !self.cache.exists(key).await? {
            return Ok(None);
        }

        let name = self.cache.hget(key, FIELD_NAME).await?;
        let surname = self.cache.hget(key, FIELD_SURNAME).await?;

        match (name, surname) {
            (Some(name), Some(surname)) => Ok(Some(Person {
                id: Some(id),
                name,
                surname,
            })),
            _ => Ok(None),
        }
    }

    /// Overwrites the cached projection of a person.
    async fn write_fields(&self, key: &str, person: &Person) -> CacheResult<()> {
        self.cache.hset(key, FIELD_NAME, &person.name).await?;
        self.cache.hset(key, FIELD_SURNAME, &person.surname).await?;
        Ok(())
    }
}
