use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/rooms",
    tag = "sse",
    responses((status = 200, description = "Room lifecycle events", content_type = "text/event-stream", body = String))
)]
/// Stream room lifecycle events (created, joined, closed, result submitted).
pub async fn room_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_rooms(&state);
    info!("New room SSE connection");
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/rooms", get(room_stream))
}
