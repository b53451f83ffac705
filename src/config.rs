//! Configuration Module
//!
//! Loads service, cache-server and pool settings from environment variables.
//! Invalid values fall back to the documented defaults with a warning; a bad
//! environment is never fatal to startup.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::pool::PoolConfig;

/// Default cache-server port.
const DEFAULT_REDIS_PORT: u16 = 6379;

/// Key prefixes cached by default when `CACHE_PREFIXES` is not set.
const DEFAULT_PREFIXES: [&str; 5] = ["foo", "user", "session", "person", "hello"];

/// Service configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache-server host
    pub redis_host: String,
    /// Cache-server port
    pub redis_port: u16,
    /// Optional cache-server credential; omitted from the handshake if absent
    pub redis_password: Option<String>,
    /// Maximum number of entries in the client-side cache
    pub cache_max_size: usize,
    /// Key prefixes eligible for client-side caching
    pub cacheable_prefixes: Vec<String>,
    /// Connection pool bounds and timing
    pub pool: PoolConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `REDIS_HOST` - Cache-server host (default: localhost)
    /// - `REDIS_PORT` - Cache-server port (default: 6379)
    /// - `REDIS_PASSWORD` - Optional credential
    /// - `CACHE_MAX_SIZE` - Client-side cache capacity (default: 1000)
    /// - `CACHE_PREFIXES` - Comma-separated cacheable prefixes
    /// - `POOL_MAX_TOTAL` / `POOL_MAX_IDLE` / `POOL_MIN_IDLE` - Pool bounds
    /// - `POOL_EVICTION_SECS` - Idle sweep interval (default: 30)
    /// - `POOL_MAX_WAIT_MS` - Max wait when exhausted (default: 2000)
    pub fn from_env() -> Self {
        let redis_host = env::var("REDIS_HOST")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        // Non-numeric port values fall back to the default with a warning.
        let redis_port = match env::var("REDIS_PORT") {
            Ok(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid REDIS_PORT value {:?}. Using default port {}", raw, DEFAULT_REDIS_PORT);
                DEFAULT_REDIS_PORT
            }),
            _ => DEFAULT_REDIS_PORT,
        };

        let redis_password = env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty());

        let cacheable_prefixes = match env::var("CACHE_PREFIXES") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            _ => DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
        };

        Self {
            server_port: env_or("SERVER_PORT", 8080),
            redis_host,
            redis_port,
            redis_password,
            cache_max_size: env_or("CACHE_MAX_SIZE", 1000),
            cacheable_prefixes,
            pool: PoolConfig {
                max_total: env_or("POOL_MAX_TOTAL", 10),
                max_idle: env_or("POOL_MAX_IDLE", 5),
                min_idle: env_or("POOL_MIN_IDLE", 2),
                eviction_interval: Duration::from_secs(env_or("POOL_EVICTION_SECS", 30)),
                max_wait: Duration::from_millis(env_or("POOL_MAX_WAIT_MS", 2000)),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            redis_host: "localhost".to_string(),
            redis_port: DEFAULT_REDIS_PORT,
            redis_password: None,
            cache_max_size: 1000,
            cacheable_prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            pool: PoolConfig::default(),
        }
    }
}

/// Parses an environment variable. Unset or empty values take the default
/// silently; present but unparsable values take it with a warning.
fn env_or<T: FromStr + Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {} value {:?}. Using default {}", name, raw, default);
            default
        }),
        _ => default,
    }
}
