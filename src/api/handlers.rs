//! API Handlers
//!
//! HTTP request handlers for the person CRUD endpoints. Handlers map CRUD
//! verbs onto the person service; all caching behavior lives behind it.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::StoreResult;
use crate::models::{HealthResponse, Person, PersonPayload};
use crate::service::PersonService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Entity service fronting the backing store and the cache
    pub service: Arc<PersonService>,
}

impl AppState {
    /// Creates a new AppState around a person service.
    pub fn new(service: PersonService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Handler for GET /api/persons
pub async fn list_persons(State(state): State<AppState>) -> StoreResult<Json<Vec<Person>>> {
    let persons = state.service.find_all().await?;
    Ok(Json(persons))
}

/// Handler for GET /api/persons/:id
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> StoreResult<Json<Person>> {
    let person = state.service.find_by_id(id).await?;
    Ok(Json(person))
}

/// Handler for POST /api/persons
pub async fn create_person(
    State(state): State<AppState>,
    Json(payload): Json<PersonPayload>,
) -> StoreResult<(StatusCode, Json<Person>)> {
    let saved = state.service.save(payload.into_person()).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Handler for PUT /api/persons/:id
///
/// Read-modify-write: missing ids answer 404 instead of inserting.
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<PersonPayload>,
) -> StoreResult<Json<Person>> {
    let existing = state.service.find_by_id(id).await?;
    let saved = state.service.save(payload.apply_to(existing)).await?;
    Ok(Json(saved))
}

/// Handler for DELETE /api/persons/:id
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> StoreResult<StatusCode> {
    state.service.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.service.cache_stats().await;
    Json(HealthResponse::healthy(stats))
}
