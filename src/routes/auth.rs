use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, services::identity, state::SharedState};

const BEARER_PREFIX: &str = "Bearer ";

/// Credential presented by the caller, kept for handlers that act on the user record.
#[derive(Debug, Clone)]
pub struct UserToken(pub String);

/// Resolve the bearer token and expose the caller to handlers as `Extension<Player>`.
pub async fn require_user(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(|value| value.trim().to_owned())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

    let player = identity::resolve(&state, &token).await?;

    req.extensions_mut().insert(player);
    req.extensions_mut().insert(UserToken(token));
    Ok(next.run(req).await)
}
