//! Request-level room operations: drive the core components and map their outcomes to
//! DTOs. Lifecycle events are published by the components inside their critical sections.

use tracing::info;

use crate::{
    dao::models::RoomId,
    dto::room::{
        JoinRoomResult, ResultUser, RoomCreateRequest, RoomCreateResponse, RoomEndRequest,
        RoomInfo, RoomJoinRequest, RoomJoinResponse, RoomListResponse, RoomResultResponse,
        RoomUser, RoomWaitResponse,
    },
    error::ServiceError,
    services::{membership, result_aggregator, room_registry, status_projector},
    state::{
        SharedState,
        lobby::{Player, Submission},
    },
};

/// Open a room for the requested live with the caller as host.
pub async fn create_room(
    state: &SharedState,
    host: &Player,
    request: RoomCreateRequest,
) -> Result<RoomCreateResponse, ServiceError> {
    let capacity = state.config().room_capacity();
    let room = room_registry::create(
        state,
        request.live_id,
        capacity,
        host,
        request.select_difficulty,
    )
    .await?;

    Ok(RoomCreateResponse { room_id: room.id })
}

/// Open rooms of `live_id`, oldest first.
pub async fn list_rooms(state: &SharedState, live_id: u32) -> Result<RoomListResponse, ServiceError> {
    let rooms = room_registry::list(state, live_id).await?;
    Ok(RoomListResponse {
        room_info_list: rooms.into_iter().map(RoomInfo::from).collect(),
    })
}

/// Try to seat the caller in the requested room.
pub async fn join_room(
    state: &SharedState,
    player: &Player,
    request: RoomJoinRequest,
) -> Result<RoomJoinResponse, ServiceError> {
    let report = membership::admit(state, request.room_id, player, request.select_difficulty)
        .await?;

    Ok(RoomJoinResponse {
        join_room_result: JoinRoomResult::from(report.admission),
    })
}

/// Status and roster of the room, flagging the caller's own entry.
pub async fn wait_room(
    state: &SharedState,
    player: &Player,
    room_id: RoomId,
) -> Result<RoomWaitResponse, ServiceError> {
    let view = status_projector::wait(state, room_id).await?;
    Ok(RoomWaitResponse {
        status: view.status.into(),
        room_user_list: view
            .members
            .into_iter()
            .map(|member| RoomUser::from_member(member, player.id))
            .collect(),
    })
}

/// Start the live on behalf of the host.
pub async fn start_room(
    state: &SharedState,
    player: &Player,
    room_id: RoomId,
) -> Result<(), ServiceError> {
    if !room_registry::start(state, room_id, player).await? {
        info!(room_id, user_id = player.id, "room already started");
    }
    Ok(())
}

/// Record the caller's result for the room.
///
/// A repeated submission is returned as [`Submission::DuplicateSubmission`] for the route
/// to turn into a conflict.
pub async fn end_room(
    state: &SharedState,
    player: &Player,
    request: RoomEndRequest,
) -> Result<Submission, ServiceError> {
    let outcome = result_aggregator::submit(
        state,
        request.room_id,
        player,
        request.judge_count_list,
        request.score,
    )
    .await?;

    if outcome == Submission::DuplicateSubmission {
        info!(room_id = request.room_id, user_id = player.id, "result already submitted");
    }
    Ok(outcome)
}

/// Results recorded so far, in join order.
pub async fn room_result(
    state: &SharedState,
    room_id: RoomId,
) -> Result<RoomResultResponse, ServiceError> {
    let results = result_aggregator::results(state, room_id).await?;
    Ok(RoomResultResponse {
        result_user_list: results.into_iter().map(ResultUser::from).collect(),
    })
}
