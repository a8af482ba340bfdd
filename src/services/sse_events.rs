use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::{RoomEntity, RoomId, UserId},
    dto::sse::{
        MemberJoinedEvent, ResultSubmittedEvent, RoomClosedEvent, RoomCreatedEvent, ServerEvent,
    },
    state::SharedState,
};

const EVENT_ROOM_CREATED: &str = "room_created";
const EVENT_MEMBER_JOINED: &str = "member_joined";
const EVENT_ROOM_CLOSED: &str = "room_closed";
const EVENT_RESULT_SUBMITTED: &str = "result_submitted";

/// Broadcast that a room opened for its live.
pub fn broadcast_room_created(state: &SharedState, room: &RoomEntity) {
    let payload = RoomCreatedEvent {
        room_id: room.id,
        live_id: room.live_id,
        max_user_count: room.max_user_count,
    };
    send_room_event(state, EVENT_ROOM_CREATED, &payload);
}

/// Broadcast that a player took a seat, with the updated count.
pub fn broadcast_member_joined(state: &SharedState, room: &RoomEntity, user_id: UserId) {
    let payload = MemberJoinedEvent {
        room_id: room.id,
        user_id,
        joined_user_count: room.joined_user_count,
    };
    send_room_event(state, EVENT_MEMBER_JOINED, &payload);
}

/// Broadcast that a room stopped accepting players.
pub fn broadcast_room_closed(state: &SharedState, room: &RoomEntity) {
    let payload = RoomClosedEvent {
        room_id: room.id,
        started: room.started,
    };
    send_room_event(state, EVENT_ROOM_CLOSED, &payload);
}

/// Broadcast that a member's result was recorded.
pub fn broadcast_result_submitted(state: &SharedState, room_id: RoomId, user_id: UserId) {
    let payload = ResultSubmittedEvent { room_id, user_id };
    send_room_event(state, EVENT_RESULT_SUBMITTED, &payload);
}

fn send_room_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.room_events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize room SSE payload"),
    }
}
