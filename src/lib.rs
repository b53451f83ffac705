//! CRUD demo service with a selective client-side read-through cache
//!
//! A person CRUD API backed by a repository and fronted by a bounded
//! client-side cache kept consistent through write-through and
//! delete-invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod repository;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use service::PersonService;
