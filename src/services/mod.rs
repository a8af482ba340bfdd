//! Services behind the HTTP routes.

/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Bearer token issuing and resolution.
pub mod identity;
/// Admission control and room rosters.
pub mod membership;
/// Per-member result recording and aggregation.
pub mod result_aggregator;
/// Room rows and their lifecycle transitions.
pub mod room_registry;
/// Request-level room operations used by the HTTP routes.
pub mod room_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming.
pub mod sse_service;
/// Wait status derived for polling clients.
pub mod status_projector;
