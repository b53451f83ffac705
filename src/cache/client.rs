//! Client-Side Caching Client
//!
//! Combines the connection pool, the RESP wire commands and the bounded
//! side cache behind one handle. Read commands on keys accepted by the
//! cacheability policy are served locally when possible and populate the
//! side cache otherwise; writes go to the server and keep the local copy
//! in step.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{Cacheable, CacheStats, Command, SideCache};
use crate::error::{CacheError, CacheResult};
use crate::pool::{ConnectionPool, Resp};

// == Entity Cache Port ==
/// Cache operations consumed by the entity service. Implemented by the
/// real client and by test doubles.
#[async_trait]
pub trait EntityCache: Send + Sync {
    /// Delegates to the configured cacheability policy.
    fn is_cacheable(&self, command: Command, keys: &[&str]) -> bool;

    /// Whether the key exists, locally or on the server.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Reads one field of a record.
    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>>;

    /// Writes one field of a record.
    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()>;

    /// Deletes a record on the server and locally.
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Snapshot of the side-cache counters.
    async fn stats(&self) -> CacheStats;
}

// == CSC Client ==
/// Pool-backed cache client with a local bounded side cache.
pub struct CscClient {
    pool: ConnectionPool,
    side: RwLock<SideCache>,
    policy: Arc<dyn Cacheable>,
}

impl CscClient {
    /// Creates a client over `pool` with a side cache of `max_entries`
    /// records, gated by `policy`.
    pub fn new(pool: ConnectionPool, max_entries: usize, policy: Arc<dyn Cacheable>) -> Self {
        Self {
            pool,
            side: RwLock::new(SideCache::new(max_entries)),
            policy,
        }
    }

    /// Runs one command over a pooled connection.
    ///
    /// The connection returns to the pool on success and is discarded on
    /// failure, so a broken stream never re-enters the idle list.
    async fn command(&self, parts: &[&str]) -> CacheResult<Resp> {
        let mut conn = self.pool.acquire().await?;
        match conn.command(parts).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                conn.discard();
                Err(err)
            }
        }
    }
}

#[async_trait]
impl EntityCache for CscClient {
    fn is_cacheable(&self, command: Command, keys: &[&str]) -> bool {
        self.policy.is_cacheable(command, keys)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        if self.policy.is_cacheable(Command::Exists, &[key]) && self.side.read().await.exists(key) {
            return Ok(true);
        }

        match self.command(&["EXISTS", key]).await? {
            Resp::Integer(n) => Ok(n > 0),
            other => Err(CacheError::Protocol(format!(
                "unexpected EXISTS reply: {:?}",
                other
            ))),
        }
    }

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let cacheable = self.policy.is_cacheable(Command::HGet, &[key]);

        if cacheable {
            if let Some(value) = self.side.write().await.get_field(key, field) {
                debug!(key, field, "served field from side cache");
                return Ok(Some(value));
            }
        }

        let value = match self.command(&["HGET", key, field]).await? {
            Resp::Bulk(value) => Some(value),
            Resp::Null => None,
            other => {
                return Err(CacheError::Protocol(format!(
                    "unexpected HGET reply: {:?}",
                    other
                )))
            }
        };

        // Lazy population on read miss; absent fields are never cached.
        if cacheable {
            if let Some(value) = &value {
                self.side.write().await.set_field(key, field, value.clone());
            }
        }
        Ok(value)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        match self.command(&["HSET", key, field, value]).await? {
            Resp::Integer(_) => {}
            other => {
                return Err(CacheError::Protocol(format!(
                    "unexpected HSET reply: {:?}",
                    other
                )))
            }
        }

        // Write-through: keep the local copy fresh for keys the policy
        // would cache on read.
        if self.policy.is_cacheable(Command::HGet, &[key]) {
            self.side.write().await.set_field(key, field, value);
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let reply = self.command(&["DEL", key]).await?;

        // Local invalidation happens regardless of cacheability; removing
        // an uncached key is a no-op.
        self.side.write().await.delete(key);

        match reply {
            Resp::Integer(_) => Ok(()),
            other => Err(CacheError::Protocol(format!(
                "unexpected DEL reply: {:?}",
                other
            ))),
        }
    }

    async fn stats(&self) -> CacheStats {
        self.side.read().await.stats()
    }
}
