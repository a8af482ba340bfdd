//! Payload of the health route.

use serde::Serialize;
use utoipa::ToSchema;

/// Whether the room store answered the last health check in time.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// The store answered.
    Ok,
    /// The store failed or timed out; room operations will fail until it recovers.
    Degraded,
}

/// Payload of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Store health.
    pub status: HealthStatus,
    /// Clients currently attached to the room event stream.
    pub event_subscribers: usize,
}

impl HealthResponse {
    /// Build the payload from a store status and the current subscriber count.
    pub fn new(status: HealthStatus, event_subscribers: usize) -> Self {
        Self {
            status,
            event_subscribers,
        }
    }
}
