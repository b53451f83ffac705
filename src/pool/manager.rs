//! Connection Pool Manager
//!
//! Bounded pool of cache-server connections. Checkouts are gated by a
//! semaphore with a maximum wait; released connections return to a capped
//! idle list. A background sweep tests idle connections and keeps the
//! configured minimum alive.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Duration};
use tracing::{debug, info};

use crate::error::{CacheError, CacheResult};
use crate::pool::{ConnectTarget, Connection, Resp};

// == Pool Config ==
/// Bounds and timing for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum concurrently checked-out connections
    pub max_total: usize,
    /// Maximum connections kept in the idle list
    pub max_idle: usize,
    /// Idle connections the sweep keeps alive
    pub min_idle: usize,
    /// Interval between idle sweeps
    pub eviction_interval: Duration,
    /// Maximum wait for a checkout when the pool is exhausted
    pub max_wait: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_total: 10,
            max_idle: 5,
            min_idle: 2,
            eviction_interval: Duration::from_secs(30),
            max_wait: Duration::from_secs(2),
        }
    }
}

struct PoolInner {
    target: ConnectTarget,
    config: PoolConfig,
    permits: Arc<Semaphore>,
    idle: Mutex<VecDeque<Connection>>,
}

impl PoolInner {
    fn pop_idle(&self) -> Option<Connection> {
        self.idle.lock().ok().and_then(|mut idle| idle.pop_front())
    }

    fn push_idle(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.config.max_idle {
                idle.push_back(conn);
            }
            // At max_idle the connection is dropped and its socket closed.
        }
    }
}

// == Connection Pool ==
/// Shared handle to the pool. Cloning is cheap; all clones feed the same
/// pool.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Creates a pool dialing `target` on demand. No connections are opened
    /// until the first checkout or sweep.
    pub fn new(target: ConnectTarget, config: PoolConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_total));
        Self {
            inner: Arc::new(PoolInner {
                target,
                config,
                permits,
                idle: Mutex::new(VecDeque::new()),
            }),
        }
    }

    // == Acquire ==
    /// Checks out a connection, blocking up to the configured max wait.
    ///
    /// Reuses an idle connection when available, otherwise dials a new one.
    /// The returned guard gives the connection back on drop, on every exit
    /// path.
    pub async fn acquire(&self) -> CacheResult<PooledConnection> {
        let permit = match timeout(
            self.inner.config.max_wait,
            self.inner.permits.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(CacheError::Closed),
            Err(_) => return Err(CacheError::PoolExhausted(self.inner.config.max_wait)),
        };

        let conn = match self.inner.pop_idle() {
            Some(conn) => conn,
            None => Connection::connect(&self.inner.target).await?,
        };

        Ok(PooledConnection {
            conn: Some(conn),
            inner: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Current number of idle connections.
    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    // == Idle Sweep ==
    /// Spawns the background test-while-idle sweep.
    ///
    /// Each round drains the idle list, pings every connection, drops the
    /// dead ones and reconnects best-effort up to min_idle while checkout
    /// permits remain. The handle can be aborted during shutdown.
    pub fn spawn_eviction_task(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            info!(
                "Starting pool idle sweep every {:?}",
                inner.config.eviction_interval
            );
            let mut ticker = interval(inner.config.eviction_interval);
            // The first tick fires immediately; skip it so rounds start one
            // interval after spawn.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let drained: Vec<Connection> = match inner.idle.lock() {
                    Ok(mut idle) => idle.drain(..).collect(),
                    Err(_) => continue,
                };
                let drained_count = drained.len();

                let mut alive = Vec::with_capacity(drained_count);
                for mut conn in drained {
                    if conn.ping().await {
                        alive.push(conn);
                    }
                }
                let dropped = drained_count - alive.len();

                // A fully checked-out pool is already at its connection
                // bound; the top-up waits for the next round.
                while alive.len() < inner.config.min_idle {
                    if inner.permits.available_permits() == 0 {
                        break;
                    }
                    match Connection::connect(&inner.target).await {
                        Ok(conn) => alive.push(conn),
                        Err(err) => {
                            debug!(error = %err, "idle replenish failed");
                            break;
                        }
                    }
                }

                if let Ok(mut idle) = inner.idle.lock() {
                    for conn in alive {
                        if idle.len() < inner.config.max_idle {
                            idle.push_back(conn);
                        }
                    }
                    debug!(
                        idle = idle.len(),
                        dropped, "pool sweep complete"
                    );
                }
            }
        })
    }
}

// == Pooled Connection Guard ==
/// Checked-out connection. Returns itself to the idle list on drop unless
/// discarded.
pub struct PooledConnection {
    conn: Option<Connection>,
    inner: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Sends one command on the underlying connection.
    pub async fn command(&mut self, parts: &[&str]) -> CacheResult<Resp> {
        match self.conn.as_mut() {
            Some(conn) => conn.command(parts).await,
            None => Err(CacheError::Closed),
        }
    }

    /// Closes the underlying socket instead of returning it to the pool.
    /// Callers discard a connection after any command failure, since the
    /// stream may hold a half-read reply.
    pub fn discard(&mut self) {
        self.conn = None;
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.inner.push_idle(conn);
        }
        // The checkout permit is released when `_permit` drops.
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_target() -> ConnectTarget {
        // Port 1 refuses connections immediately on loopback.
        ConnectTarget {
            host: "127.0.0.1".to_string(),
            port: 1,
            password: None,
        }
    }

    fn quick_config() -> PoolConfig {
        PoolConfig {
            max_wait: Duration::from_millis(50),
            ..PoolConfig::default()
        }
    }

    #[tokio::test]
    async fn test_acquire_unreachable_server_fails_transiently() {
        let pool = ConnectionPool::new(unreachable_target(), quick_config());

        let result = pool.acquire().await;
        assert!(matches!(
            result,
            Err(CacheError::Io(_)) | Err(CacheError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_pool_starts_with_no_idle_connections() {
        let pool = ConnectionPool::new(unreachable_target(), quick_config());
        assert_eq!(pool.idle_count(), 0);
    }

    #[tokio::test]
    async fn test_eviction_task_can_be_aborted() {
        let pool = ConnectionPool::new(unreachable_target(), quick_config());

        let handle = pool.spawn_eviction_task();
        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished());
    }
}
