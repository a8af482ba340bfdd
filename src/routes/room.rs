use axum::{Extension, Json, Router, extract::State, middleware, routing::post};
use axum_valid::Valid;

use crate::{
    dto::{
        room::{
            RoomCreateRequest, RoomCreateResponse, RoomEndRequest, RoomIdRequest,
            RoomJoinRequest, RoomJoinResponse, RoomListRequest, RoomListResponse,
            RoomResultResponse, RoomWaitResponse,
        },
        user::Empty,
    },
    error::AppError,
    routes::auth::require_user,
    services::room_service,
    state::{
        SharedState,
        lobby::{Player, Submission},
    },
};

/// Room lifecycle endpoints. Every route requires a bearer token.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/room/create", post(create_room))
        .route("/room/list", post(list_rooms))
        .route("/room/join", post(join_room))
        .route("/room/wait", post(wait_room))
        .route("/room/start", post(start_room))
        .route("/room/end", post(end_room))
        .route("/room/result", post(room_result))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

/// Open a room for a live with the caller as host.
#[utoipa::path(
    post,
    path = "/room/create",
    tag = "room",
    security(("bearer" = [])),
    request_body = RoomCreateRequest,
    responses((status = 200, description = "Room created", body = RoomCreateResponse))
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Extension(player): Extension<Player>,
    Valid(Json(payload)): Valid<Json<RoomCreateRequest>>,
) -> Result<Json<RoomCreateResponse>, AppError> {
    Ok(Json(
        room_service::create_room(&state, &player, payload).await?,
    ))
}

/// Rooms of a live still accepting players.
#[utoipa::path(
    post,
    path = "/room/list",
    tag = "room",
    security(("bearer" = [])),
    request_body = RoomListRequest,
    responses((status = 200, description = "Open rooms, oldest first", body = RoomListResponse))
)]
pub async fn list_rooms(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RoomListRequest>>,
) -> Result<Json<RoomListResponse>, AppError> {
    Ok(Json(room_service::list_rooms(&state, payload.live_id).await?))
}

/// Try to take a seat. Full and closed rooms are reported in the body, not as errors.
#[utoipa::path(
    post,
    path = "/room/join",
    tag = "room",
    security(("bearer" = [])),
    request_body = RoomJoinRequest,
    responses(
        (status = 200, description = "Join outcome", body = RoomJoinResponse),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Extension(player): Extension<Player>,
    Valid(Json(payload)): Valid<Json<RoomJoinRequest>>,
) -> Result<Json<RoomJoinResponse>, AppError> {
    Ok(Json(room_service::join_room(&state, &player, payload).await?))
}

/// Poll the room status and roster.
#[utoipa::path(
    post,
    path = "/room/wait",
    tag = "room",
    security(("bearer" = [])),
    request_body = RoomIdRequest,
    responses((status = 200, description = "Status and roster", body = RoomWaitResponse))
)]
pub async fn wait_room(
    State(state): State<SharedState>,
    Extension(player): Extension<Player>,
    Valid(Json(payload)): Valid<Json<RoomIdRequest>>,
) -> Result<Json<RoomWaitResponse>, AppError> {
    Ok(Json(
        room_service::wait_room(&state, &player, payload.room_id).await?,
    ))
}

/// Start the live. Host only.
#[utoipa::path(
    post,
    path = "/room/start",
    tag = "room",
    security(("bearer" = [])),
    request_body = RoomIdRequest,
    responses(
        (status = 200, description = "Room started", body = Empty),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn start_room(
    State(state): State<SharedState>,
    Extension(player): Extension<Player>,
    Valid(Json(payload)): Valid<Json<RoomIdRequest>>,
) -> Result<Json<Empty>, AppError> {
    room_service::start_room(&state, &player, payload.room_id).await?;
    Ok(Json(Empty::default()))
}

/// Submit the caller's judge counts and score.
#[utoipa::path(
    post,
    path = "/room/end",
    tag = "room",
    security(("bearer" = [])),
    request_body = RoomEndRequest,
    responses(
        (status = 200, description = "Result recorded", body = Empty),
        (status = 403, description = "Caller is not a member"),
        (status = 409, description = "Result already submitted")
    )
)]
pub async fn end_room(
    State(state): State<SharedState>,
    Extension(player): Extension<Player>,
    Valid(Json(payload)): Valid<Json<RoomEndRequest>>,
) -> Result<Json<Empty>, AppError> {
    let room_id = payload.room_id;
    match room_service::end_room(&state, &player, payload).await? {
        Submission::Recorded => Ok(Json(Empty::default())),
        Submission::DuplicateSubmission => Err(AppError::Conflict(format!(
            "result already submitted for room `{room_id}`"
        ))),
    }
}

/// Results submitted so far, in join order.
#[utoipa::path(
    post,
    path = "/room/result",
    tag = "room",
    security(("bearer" = [])),
    request_body = RoomIdRequest,
    responses(
        (status = 200, description = "Recorded results", body = RoomResultResponse),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn room_result(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RoomIdRequest>>,
) -> Result<Json<RoomResultResponse>, AppError> {
    Ok(Json(
        room_service::room_result(&state, payload.room_id).await?,
    ))
}
