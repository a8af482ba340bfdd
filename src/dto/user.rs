//! DTO definitions for the user (identity) endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{dto::validation::validate_display_name, state::lobby::Player};

/// Payload used to register a user or update their profile.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserCreateRequest {
    /// Display name shown to other players.
    pub user_name: String,
    /// Card shown next to the name.
    pub leader_card_id: u32,
}

impl Validate for UserCreateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_display_name(&self.user_name) {
            errors.add("user_name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Credential issued to a freshly registered user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserCreateResponse {
    /// Bearer token to send in the `Authorization` header.
    pub user_token: String,
}

/// Public profile of the caller, without the credential.
#[derive(Debug, Serialize, ToSchema)]
pub struct SafeUser {
    /// User id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Leader card.
    pub leader_card_id: u32,
}

impl From<Player> for SafeUser {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            leader_card_id: player.leader_card_id,
        }
    }
}

/// Empty JSON object returned by commands without a payload.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Empty {}
