use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Ping the room store and report `degraded` when it does not answer in time.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let status = match state
        .bounded("health_check", state.store().health_check())
        .await
    {
        Ok(()) => HealthStatus::Ok,
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthStatus::Degraded
        }
    };

    HealthResponse::new(status, state.room_events().subscriber_count())
}
