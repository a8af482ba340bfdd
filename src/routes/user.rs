use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::user::{Empty, SafeUser, UserCreateRequest, UserCreateResponse},
    error::AppError,
    routes::auth::{UserToken, require_user},
    services::identity,
    state::{SharedState, lobby::Player},
};

/// User registration and profile endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    let authed = Router::new()
        .route("/user/me", get(me))
        .route("/user/update", post(update))
        .route_layer(middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/user/create", post(create))
        .merge(authed)
}

/// Register a user and issue their bearer token.
#[utoipa::path(
    post,
    path = "/user/create",
    tag = "user",
    request_body = UserCreateRequest,
    responses(
        (status = 200, description = "User registered", body = UserCreateResponse),
        (status = 400, description = "Invalid profile")
    )
)]
pub async fn create(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<UserCreateRequest>>,
) -> Result<Json<UserCreateResponse>, AppError> {
    let user_token =
        identity::create_user(&state, payload.user_name, payload.leader_card_id).await?;
    Ok(Json(UserCreateResponse { user_token }))
}

/// Profile of the caller.
#[utoipa::path(
    get,
    path = "/user/me",
    tag = "user",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller profile", body = SafeUser),
        (status = 401, description = "Missing or unknown token")
    )
)]
pub async fn me(Extension(player): Extension<Player>) -> Json<SafeUser> {
    Json(SafeUser::from(player))
}

/// Change the caller's name and leader card. Rooms already joined keep the old profile.
#[utoipa::path(
    post,
    path = "/user/update",
    tag = "user",
    security(("bearer" = [])),
    request_body = UserCreateRequest,
    responses(
        (status = 200, description = "Profile updated", body = Empty),
        (status = 401, description = "Missing or unknown token")
    )
)]
pub async fn update(
    State(state): State<SharedState>,
    Extension(UserToken(token)): Extension<UserToken>,
    Valid(Json(payload)): Valid<Json<UserCreateRequest>>,
) -> Result<Json<Empty>, AppError> {
    identity::update_user(&state, &token, payload.user_name, payload.leader_card_id).await?;
    Ok(Json(Empty::default()))
}
