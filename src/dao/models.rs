//! Rows persisted by the room store.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;

/// Identifier assigned to a user by the identity store.
pub type UserId = u64;
/// Identifier assigned to a room on creation, never reused.
pub type RoomId = u64;

/// Difficulty a participant picked for the live.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LiveDifficulty {
    /// Standard chart.
    Normal,
    /// Harder chart.
    Hard,
}

/// Registered user together with the opaque credential issued at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Stable numeric identifier.
    pub id: UserId,
    /// Bearer credential handed back to the client.
    pub token: String,
    /// Display name.
    pub name: String,
    /// Card shown as the user's avatar.
    pub leader_card_id: u32,
}

/// Room metadata owned by the room registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Primary key of the room.
    pub id: RoomId,
    /// Song the room plays.
    pub live_id: u32,
    /// Capacity fixed at creation.
    pub max_user_count: u32,
    /// Number of memberships currently recorded for the room.
    pub joined_user_count: u32,
    /// Whether the room still accepts joins and shows up in listings.
    pub is_open: bool,
    /// Whether the host explicitly started the session.
    pub started: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Participation record, with the user's profile copied at join time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberEntity {
    /// Room joined.
    pub room_id: RoomId,
    /// Member's user id.
    pub user_id: UserId,
    /// Display name at join time.
    pub name: String,
    /// Leader card at join time.
    pub leader_card_id: u32,
    /// Difficulty chosen when joining.
    pub select_difficulty: LiveDifficulty,
    /// Exactly one member per room carries this flag.
    pub is_host: bool,
    /// Orders the roster.
    pub joined_at: SystemTime,
}

/// Score recorded once per member at the end of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultEntity {
    /// Room the live was played in.
    pub room_id: RoomId,
    /// Member who submitted.
    pub user_id: UserId,
    /// Ordered judge counters (e.g. perfect, great, good, bad, miss).
    pub judge_count_list: Vec<u32>,
    /// Final score.
    pub score: u32,
    /// When the result was recorded.
    pub submitted_at: SystemTime,
}

/// Consistent view of a room read in a single store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    /// Room row.
    pub room: RoomEntity,
    /// Memberships in join order, host first.
    pub members: Vec<MemberEntity>,
    /// Results in submission order.
    pub results: Vec<ResultEntity>,
}
