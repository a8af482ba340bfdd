//! Room registry: owns the room rows (capacity, open/started flags, live) and the
//! create / list / get / close / start operations.

use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::{
    dao::{
        models::{LiveDifficulty, RoomEntity, RoomId},
        room_store::{RoomTransaction, RoomWrite},
    },
    error::ServiceError,
    services::{membership, sse_events},
    state::{SharedState, lobby::Player},
};

/// Build the row of a room whose host already holds the first seat.
pub fn new_room(id: RoomId, live_id: u32, capacity: u32, created_at: SystemTime) -> RoomEntity {
    RoomEntity {
        id,
        live_id,
        max_user_count: capacity,
        joined_user_count: 1,
        is_open: 1 < capacity,
        started: false,
        created_at,
    }
}

/// Allocate a room for `live_id` with `host` seated, in a single commit.
///
/// Publishes `room_created` (and `room_closed` for a single-seat room) while the room
/// lock is still held.
pub async fn create(
    state: &SharedState,
    live_id: u32,
    capacity: u32,
    host: &Player,
    difficulty: LiveDifficulty,
) -> Result<RoomEntity, ServiceError> {
    let store = state.store();
    let room_id = state
        .bounded("allocate_room_id", store.allocate_room_id())
        .await?;

    state
        .run_creating(room_id, move || async move {
            let now = SystemTime::now();
            let room = new_room(room_id, live_id, capacity, now);

            let mut tx = RoomTransaction::new(room_id);
            tx.push(RoomWrite::InsertRoom(room.clone()));
            membership::stage_host(&mut tx, room_id, host, difficulty, now);
            state.bounded("commit", store.commit(tx)).await?;

            info!(room_id, live_id, host = host.id, capacity, "room created");
            sse_events::broadcast_room_created(state, &room);
            if !room.is_open {
                sse_events::broadcast_room_closed(state, &room);
            }
            Ok(room)
        })
        .await
}

/// Look up a room, failing with [`ServiceError::NotFound`] when it does not exist.
pub async fn get(state: &SharedState, room_id: RoomId) -> Result<RoomEntity, ServiceError> {
    find(state, room_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))
}

/// Look up a room, `None` when it does not exist.
pub async fn find(state: &SharedState, room_id: RoomId) -> Result<Option<RoomEntity>, ServiceError> {
    let room = state
        .bounded("find_room", state.store().find_room(room_id))
        .await?;
    Ok(room)
}

/// Rooms of `live_id` still accepting players, oldest first.
pub async fn list(state: &SharedState, live_id: u32) -> Result<Vec<RoomEntity>, ServiceError> {
    let rooms = state
        .bounded("list_open_rooms", state.store().list_open_rooms(live_id))
        .await?;
    debug!(live_id, count = rooms.len(), "listed open rooms");
    Ok(rooms)
}

/// Stage one more seat taken; the room closes when the last seat goes.
///
/// Returns the row as it will be after commit.
pub fn stage_join(tx: &mut RoomTransaction, room: &RoomEntity) -> RoomEntity {
    let mut next = room.clone();
    next.joined_user_count += 1;
    if next.joined_user_count >= next.max_user_count {
        next.is_open = false;
    }
    tx.push(RoomWrite::UpdateRoom {
        expected_joined: room.joined_user_count,
        room: next.clone(),
    });
    next
}

/// Stage closing the room, optionally marking it started.
///
/// Returns `None` when the room is already in the requested state.
pub fn stage_close(
    tx: &mut RoomTransaction,
    room: &RoomEntity,
    started: bool,
) -> Option<RoomEntity> {
    let next = RoomEntity {
        is_open: false,
        started: room.started || started,
        ..room.clone()
    };
    if next == *room {
        return None;
    }
    tx.push(RoomWrite::UpdateRoom {
        expected_joined: room.joined_user_count,
        room: next.clone(),
    });
    Some(next)
}

/// Stop accepting joins. Closing a closed room is a no-op.
///
/// Returns whether the room changed.
pub async fn close(state: &SharedState, room_id: RoomId) -> Result<bool, ServiceError> {
    state
        .run_exclusive(room_id, move || async move {
            let room = get(state, room_id).await?;
            let mut tx = RoomTransaction::new(room_id);
            let Some(next) = stage_close(&mut tx, &room, false) else {
                debug!(room_id, "room already closed");
                return Ok(false);
            };
            state.bounded("commit", state.store().commit(tx)).await?;
            info!(room_id, "room closed");
            sse_events::broadcast_room_closed(state, &next);
            Ok(true)
        })
        .await
}

/// Start the live: the room closes to joins and enters its session. Host only.
///
/// Returns whether the room changed; starting twice is a no-op.
pub async fn start(
    state: &SharedState,
    room_id: RoomId,
    caller: &Player,
) -> Result<bool, ServiceError> {
    state
        .run_exclusive(room_id, move || async move {
            let room = get(state, room_id).await?;
            let host = membership::host_of(state, room_id).await?;
            if host != Some(caller.id) {
                warn!(room_id, user_id = caller.id, "non-host tried to start the room");
                return Err(ServiceError::Forbidden(format!(
                    "only the host can start room `{room_id}`"
                )));
            }

            let mut tx = RoomTransaction::new(room_id);
            let Some(next) = stage_close(&mut tx, &room, true) else {
                debug!(room_id, "room already started");
                return Ok(false);
            };
            state.bounded("commit", state.store().commit(tx)).await?;
            info!(room_id, "room started");
            sse_events::broadcast_room_closed(state, &next);
            Ok(true)
        })
        .await
}
