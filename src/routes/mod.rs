//! HTTP surface of the service.

use axum::Router;

use crate::state::SharedState;

/// Bearer token middleware.
pub mod auth;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Liveness and store health.
pub mod health;
/// Room lifecycle endpoints.
pub mod room;
/// Room event stream.
pub mod sse;
/// Registration and profile endpoints.
pub mod user;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(user::router(state.clone()))
        .merge(room::router(state.clone()));

    api_router.merge(docs::router()).with_state(state)
}
