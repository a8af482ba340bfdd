//! Status projector: derives the wait status polled by clients from the room row.

use tracing::debug;

use crate::{
    dao::models::{MemberEntity, RoomEntity, RoomId},
    error::ServiceError,
    services::membership,
    state::{SharedState, lobby::RoomStatus},
};

/// Status and roster read at the same instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitView {
    /// Derived room status.
    pub status: RoomStatus,
    /// Join order, host first. Empty once the room is disbanded.
    pub members: Vec<MemberEntity>,
}

/// Map a room row (or its absence) to the three-state view.
///
/// A full room and a started room are both `InSession`.
pub fn project(room: Option<&RoomEntity>) -> RoomStatus {
    match room {
        None => RoomStatus::Disbanded,
        Some(room) if room.is_open => RoomStatus::Waiting,
        Some(_) => RoomStatus::InSession,
    }
}

/// Current status of `room_id`; unknown rooms are `Disbanded`.
pub async fn status(state: &SharedState, room_id: RoomId) -> Result<RoomStatus, ServiceError> {
    let room = state
        .bounded("find_room", state.store().find_room(room_id))
        .await?;
    Ok(project(room.as_ref()))
}

/// Status plus roster from one store snapshot, so the roster always matches the seat count.
pub async fn wait(state: &SharedState, room_id: RoomId) -> Result<WaitView, ServiceError> {
    let snapshot = state
        .bounded("room_snapshot", state.store().room_snapshot(room_id))
        .await?;

    let view = match snapshot {
        Some(snapshot) => WaitView {
            status: project(Some(&snapshot.room)),
            members: membership::host_first(snapshot.members),
        },
        None => WaitView {
            status: RoomStatus::Disbanded,
            members: Vec::new(),
        },
    };

    debug!(room_id, status = ?view.status, members = view.members.len(), "room polled");
    Ok(view)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::LiveDifficulty, room_store::memory::MemoryRoomStore},
        services::room_registry,
        state::{AppState, lobby::Player},
    };

    fn player(id: u64) -> Player {
        Player {
            id,
            name: format!("player-{id}"),
            leader_card_id: 7,
        }
    }

    #[test]
    fn closed_rooms_are_in_session_whatever_the_reason() {
        let open = room_registry::new_room(1, 10, 4, SystemTime::now());
        assert_eq!(project(Some(&open)), RoomStatus::Waiting);

        let full = RoomEntity {
            is_open: false,
            joined_user_count: 4,
            ..open.clone()
        };
        assert_eq!(project(Some(&full)), RoomStatus::InSession);

        let started = RoomEntity {
            is_open: false,
            started: true,
            ..open
        };
        assert_eq!(project(Some(&started)), RoomStatus::InSession);
        assert_eq!(project(None), RoomStatus::Disbanded);
    }

    #[tokio::test]
    async fn polling_follows_the_room_lifecycle() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryRoomStore::new()));
        assert_eq!(status(&state, 1).await.unwrap(), RoomStatus::Disbanded);

        let room = room_registry::create(&state, 10, 4, &player(1), LiveDifficulty::Normal)
            .await
            .unwrap();
        let view = wait(&state, room.id).await.unwrap();
        assert_eq!(view.status, RoomStatus::Waiting);
        assert_eq!(view.members.len(), 1);

        room_registry::start(&state, room.id, &player(1)).await.unwrap();
        assert_eq!(status(&state, room.id).await.unwrap(), RoomStatus::InSession);

        let gone = wait(&state, 999).await.unwrap();
        assert_eq!(gone.status, RoomStatus::Disbanded);
        assert!(gone.members.is_empty());
    }
}
