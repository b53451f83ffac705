//! Error types for the service
//!
//! Two families with different recovery rules: backing-store errors are
//! surfaced to the caller, cache-layer errors are recovered locally.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Backing-store failures. Always fatal to the current operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No entity with the given id
    #[error("Person not found: {0}")]
    NotFound(u64),

    /// The backing store could not serve the request
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),
}

// == Cache Error Enum ==
/// Transient cache-layer failures.
///
/// Callers treat any of these as cache-miss/no-op: reads fall through to
/// the backing store, writes and deletes skip the cache mutation.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No connection became available within the configured wait
    #[error("Connection pool exhausted after {0:?}")]
    PoolExhausted(Duration),

    /// Connect or command exceeded its deadline
    #[error("Cache operation timed out")]
    Timeout,

    /// Socket-level failure talking to the cache server
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reply did not follow the wire protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The cache server answered with an error reply
    #[error("Cache server error: {0}")]
    Server(String),

    /// Connection or pool has been shut down
    #[error("Connection closed")]
    Closed,
}

// == IntoResponse Implementation ==
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Result of an operation against the backing store.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of an operation against the cache layer.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
