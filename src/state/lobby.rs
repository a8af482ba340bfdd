//! Domain vocabulary shared by the room services.

use crate::dao::models::{UserEntity, UserId};

/// Resolved caller identity, without the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// User id.
    pub id: UserId,
    /// Current display name.
    pub name: String,
    /// Current leader card.
    pub leader_card_id: u32,
}

impl From<UserEntity> for Player {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            leader_card_id: user.leader_card_id,
        }
    }
}

/// Outcome of a join attempt. Rejections are results, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The caller holds a seat in the room.
    Admitted,
    /// The room is open but every seat is taken.
    RoomFull,
    /// The room no longer accepts joins (started or filled up).
    RoomClosed,
}

/// Status observed by clients polling a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Still accepting joins.
    Waiting,
    /// Closed to joins, either full or started by the host.
    InSession,
    /// The room does not exist (anymore).
    Disbanded,
}

/// Outcome of an end-of-session submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The result was stored.
    Recorded,
    /// A result already exists for this member; nothing was written.
    DuplicateSubmission,
}
