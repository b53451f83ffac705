//! Connection Pool Module
//!
//! Resource-lifecycle primitive for cache-server connections: bounded
//! checkout, scoped release and a background test-while-idle sweep. Not
//! cache-aware itself.

mod connection;
mod manager;

pub use connection::{ConnectTarget, Connection, Resp};
pub use manager::{ConnectionPool, PoolConfig, PooledConnection};
