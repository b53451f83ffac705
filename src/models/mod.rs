//! Data Models
//!
//! Entity and request/response DTOs for the person API.

mod person;
mod requests;
mod responses;

pub use person::Person;
pub use requests::PersonPayload;
pub use responses::{ErrorResponse, HealthResponse};
