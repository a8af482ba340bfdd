//! Identity provider: issues bearer tokens and resolves them to players.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{SharedState, lobby::Player},
};

/// Register a user and return the bearer token identifying them.
pub async fn create_user(
    state: &SharedState,
    name: String,
    leader_card_id: u32,
) -> Result<String, ServiceError> {
    let token = Uuid::new_v4().simple().to_string();
    let user = state
        .bounded(
            "insert_user",
            state
                .store()
                .insert_user(name, token.clone(), leader_card_id),
        )
        .await?;
    info!(user_id = user.id, "user registered");
    Ok(token)
}

/// Resolve a bearer token to the player it identifies.
pub async fn resolve(state: &SharedState, token: &str) -> Result<Player, ServiceError> {
    if token.is_empty() {
        return Err(ServiceError::Unauthorized("missing user token".into()));
    }

    let user = state
        .bounded(
            "find_user_by_token",
            state.store().find_user_by_token(token.to_owned()),
        )
        .await?;

    match user {
        Some(user) => {
            debug!(user_id = user.id, "token resolved");
            Ok(user.into())
        }
        None => {
            warn!("unknown user token");
            Err(ServiceError::Unauthorized("invalid user token".into()))
        }
    }
}

/// Change the caller's profile. Rosters of rooms already joined keep the old values.
pub async fn update_user(
    state: &SharedState,
    token: &str,
    name: String,
    leader_card_id: u32,
) -> Result<Player, ServiceError> {
    let user = state
        .bounded(
            "find_user_by_token",
            state.store().find_user_by_token(token.to_owned()),
        )
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("invalid user token".into()))?;

    let mut updated = user;
    updated.name = name;
    updated.leader_card_id = leader_card_id;

    let found = state
        .bounded("update_user", state.store().update_user(updated.clone()))
        .await?;
    if !found {
        return Err(ServiceError::NotFound(format!(
            "user `{}` not found",
            updated.id
        )));
    }

    info!(user_id = updated.id, "profile updated");
    Ok(updated.into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::AppConfig, dao::room_store::memory::MemoryRoomStore, state::AppState};

    fn state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryRoomStore::new()))
    }

    #[tokio::test]
    async fn created_token_resolves_to_profile() {
        let state = state();
        let token = create_user(&state, "alice".into(), 1001).await.unwrap();
        assert_eq!(token.len(), 32);

        let player = resolve(&state, &token).await.unwrap();
        assert_eq!(player.name, "alice");
        assert_eq!(player.leader_card_id, 1001);

        let other = create_user(&state, "bob".into(), 1002).await.unwrap();
        assert_ne!(resolve(&state, &other).await.unwrap().id, player.id);
    }

    #[tokio::test]
    async fn unknown_or_empty_token_is_unauthorized() {
        let state = state();
        assert!(matches!(
            resolve(&state, "").await.unwrap_err(),
            ServiceError::Unauthorized(_)
        ));
        assert!(matches!(
            resolve(&state, "nope").await.unwrap_err(),
            ServiceError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn update_changes_resolved_profile() {
        let state = state();
        let token = create_user(&state, "alice".into(), 1).await.unwrap();

        let updated = update_user(&state, &token, "carol".into(), 2)
            .await
            .unwrap();
        assert_eq!(updated.name, "carol");
        assert_eq!(resolve(&state, &token).await.unwrap(), updated);

        assert!(matches!(
            update_user(&state, "nope", "x".into(), 3).await.unwrap_err(),
            ServiceError::Unauthorized(_)
        ));
    }
}
