//! Library crate for live-room-back, exposing modules for binaries and integration tests.

/// Layered runtime configuration.
pub mod config;
/// Storage models and the room store.
pub mod dao;
/// Request, response and event payloads.
pub mod dto;
/// Error types of the storage, service and HTTP layers.
pub mod error;
/// Axum routers and handlers.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared application state.
pub mod state;
