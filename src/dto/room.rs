//! DTO definitions used by the room REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::{LiveDifficulty, MemberEntity, ResultEntity, RoomEntity, RoomId, UserId},
    dto::{format_system_time, validation::validate_judge_counts},
    state::lobby::{Admission, RoomStatus},
};

/// Request to open a new room for a live, the caller becoming its host.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoomCreateRequest {
    /// Live the room plays.
    pub live_id: u32,
    /// Difficulty chosen by the host.
    pub select_difficulty: LiveDifficulty,
}

/// Identifier of the room just opened.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomCreateResponse {
    /// Id to share with players who want to join.
    #[schema(value_type = u64)]
    pub room_id: RoomId,
}

/// Request listing the rooms still accepting players for a live.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoomListRequest {
    /// Live whose rooms are listed.
    pub live_id: u32,
}

/// Listing entry for an open room.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomInfo {
    /// Room identifier.
    #[schema(value_type = u64)]
    pub room_id: RoomId,
    /// Live the room plays.
    pub live_id: u32,
    /// Seats taken, host included.
    pub joined_user_count: u32,
    /// Seats available in total.
    pub max_user_count: u32,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Open rooms of a live, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomListResponse {
    /// One entry per open room.
    pub room_info_list: Vec<RoomInfo>,
}

/// Request to take a seat in a room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoomJoinRequest {
    /// Room to join.
    #[validate(range(min = 1))]
    #[schema(value_type = u64)]
    pub room_id: RoomId,
    /// Difficulty chosen by the joining player.
    pub select_difficulty: LiveDifficulty,
}

/// Outcome of a join attempt as seen by clients.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JoinRoomResult {
    /// The caller now holds a seat.
    Ok,
    /// Every seat is taken; another room may still have space.
    RoomFull,
    /// The room stopped accepting players; the listing was stale.
    RoomClosed,
}

/// Answer to a join attempt.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomJoinResponse {
    /// Whether the caller got a seat, and why not otherwise.
    pub join_room_result: JoinRoomResult,
}

/// Request polled by waiting clients.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoomIdRequest {
    /// Room the request targets.
    #[validate(range(min = 1))]
    #[schema(value_type = u64)]
    pub room_id: RoomId,
}

/// Room status exposed to polling clients.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaitRoomStatus {
    /// Still gathering players.
    Waiting,
    /// The live started (or the room filled up); clients should begin playing.
    InSession,
    /// The room is gone; clients should stop polling.
    Disbanded,
}

/// Roster entry with the profile copied when the user joined.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomUser {
    /// Member's user id.
    #[schema(value_type = u64)]
    pub user_id: UserId,
    /// Display name at join time.
    pub name: String,
    /// Leader card at join time.
    pub leader_card_id: u32,
    /// Difficulty chosen when joining.
    pub select_difficulty: LiveDifficulty,
    /// Whether this entry is the caller.
    pub is_me: bool,
    /// Whether this member created the room.
    pub is_host: bool,
    /// RFC 3339 join timestamp.
    pub joined_at: String,
}

/// Status and roster returned to polling clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomWaitResponse {
    /// Current room status.
    pub status: WaitRoomStatus,
    /// Members in join order, host first.
    pub room_user_list: Vec<RoomUser>,
}

/// End-of-live submission for the caller.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomEndRequest {
    /// Room the live was played in.
    #[schema(value_type = u64)]
    pub room_id: RoomId,
    /// Ordered judge counters (e.g. perfect, great, good, bad, miss).
    pub judge_count_list: Vec<u32>,
    /// Final score.
    pub score: u32,
}

impl Validate for RoomEndRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.room_id < 1 {
            let mut err = ValidationError::new("range");
            err.message = Some("Room id must be at least 1".into());
            errors.add("room_id", err);
        }

        if let Err(e) = validate_judge_counts(&self.judge_count_list) {
            errors.add("judge_count_list", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One recorded result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultUser {
    /// Member who submitted.
    #[schema(value_type = u64)]
    pub user_id: UserId,
    /// Judge counters as submitted.
    pub judge_count_list: Vec<u32>,
    /// Score as submitted.
    pub score: u32,
}

/// Results recorded for a room.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResultResponse {
    /// Results in join order; members that have not submitted are absent.
    pub result_user_list: Vec<ResultUser>,
}

impl From<Admission> for JoinRoomResult {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Admitted => JoinRoomResult::Ok,
            Admission::RoomFull => JoinRoomResult::RoomFull,
            Admission::RoomClosed => JoinRoomResult::RoomClosed,
        }
    }
}

impl From<RoomStatus> for WaitRoomStatus {
    fn from(status: RoomStatus) -> Self {
        match status {
            RoomStatus::Waiting => WaitRoomStatus::Waiting,
            RoomStatus::InSession => WaitRoomStatus::InSession,
            RoomStatus::Disbanded => WaitRoomStatus::Disbanded,
        }
    }
}

impl From<RoomEntity> for RoomInfo {
    fn from(room: RoomEntity) -> Self {
        Self {
            room_id: room.id,
            live_id: room.live_id,
            joined_user_count: room.joined_user_count,
            max_user_count: room.max_user_count,
            created_at: format_system_time(room.created_at),
        }
    }
}

impl RoomUser {
    /// Project a membership for the caller identified by `me`.
    pub fn from_member(member: MemberEntity, me: UserId) -> Self {
        Self {
            is_me: member.user_id == me,
            user_id: member.user_id,
            name: member.name,
            leader_card_id: member.leader_card_id,
            select_difficulty: member.select_difficulty,
            is_host: member.is_host,
            joined_at: format_system_time(member.joined_at),
        }
    }
}

impl From<ResultEntity> for ResultUser {
    fn from(result: ResultEntity) -> Self {
        Self {
            user_id: result.user_id,
            judge_count_list: result.judge_count_list,
            score: result.score,
        }
    }
}
