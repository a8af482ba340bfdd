//! Payloads pushed on the room event stream.

use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::{RoomId, UserId};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name; `None` for unnamed messages.
    pub event: Option<String>,
    /// Serialized JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a room opens for a live.
pub struct RoomCreatedEvent {
    /// New room.
    #[schema(value_type = u64)]
    pub room_id: RoomId,
    /// Live the room plays.
    pub live_id: u32,
    /// Seats available in total.
    pub max_user_count: u32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player takes a seat.
pub struct MemberJoinedEvent {
    /// Room joined.
    #[schema(value_type = u64)]
    pub room_id: RoomId,
    /// Player who took the seat.
    #[schema(value_type = u64)]
    pub user_id: UserId,
    /// Seats taken after the join.
    pub joined_user_count: u32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a room stops accepting players.
pub struct RoomClosedEvent {
    /// Room that closed.
    #[schema(value_type = u64)]
    pub room_id: RoomId,
    /// True when the host started the live, false when the room filled up.
    pub started: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a member's result has been recorded.
pub struct ResultSubmittedEvent {
    /// Room the result belongs to.
    #[schema(value_type = u64)]
    pub room_id: RoomId,
    /// Member who submitted.
    #[schema(value_type = u64)]
    pub user_id: UserId,
}
