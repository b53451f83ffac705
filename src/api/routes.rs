//! API Routes
//!
//! Configures the Axum router with the person CRUD endpoints.

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_person, delete_person, get_person, health, list_persons, update_person, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/persons` - List all persons
/// - `POST /api/persons` - Create a person (201)
/// - `GET /api/persons/:id` - Fetch a person (404 when missing)
/// - `PUT /api/persons/:id` - Update a person (404 when missing)
/// - `DELETE /api/persons/:id` - Delete a person (204, 404 when missing)
/// - `GET /health` - Health check with cache counters
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/persons", get(list_persons).post(create_person))
        .route(
            "/api/persons/:id",
            get(get_person).put(update_person).delete(delete_person),
        )
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
