//! Membership coordinator: admission control against room capacity, host/guest roles
//! and the room roster.

use std::time::SystemTime;

use tracing::{debug, info};

use crate::{
    dao::{
        models::{LiveDifficulty, MemberEntity, RoomEntity, RoomId, UserId},
        room_store::{RoomTransaction, RoomWrite},
    },
    error::ServiceError,
    services::{room_registry, sse_events},
    state::{
        SharedState,
        lobby::{Admission, Player},
    },
};

/// Decision taken for a join attempt together with the room as it stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionReport {
    /// Decision taken for the attempt.
    pub admission: Admission,
    /// Room row after the attempt (the committed row when a seat was taken).
    pub room: RoomEntity,
    /// True when this call took a new seat (false for rejections and re-joins).
    pub seated: bool,
}

fn snapshot_member(
    room_id: RoomId,
    player: &Player,
    difficulty: LiveDifficulty,
    is_host: bool,
    joined_at: SystemTime,
) -> MemberEntity {
    MemberEntity {
        room_id,
        user_id: player.id,
        name: player.name.clone(),
        leader_card_id: player.leader_card_id,
        select_difficulty: difficulty,
        is_host,
        joined_at,
    }
}

/// Stage the host membership of a room being created.
pub fn stage_host(
    tx: &mut RoomTransaction,
    room_id: RoomId,
    host: &Player,
    difficulty: LiveDifficulty,
    joined_at: SystemTime,
) {
    tx.push(RoomWrite::InsertMember(snapshot_member(
        room_id, host, difficulty, true, joined_at,
    )));
}

/// Admit `player` into `room_id`.
///
/// Checks run in order under the room lock: closed rooms reject with
/// [`Admission::RoomClosed`], existing members are admitted again without any write,
/// full rooms reject with [`Admission::RoomFull`]. Otherwise the membership, the seat
/// count and, on the last seat, the close are committed together, and `member_joined`
/// (plus `room_closed` on the last seat) is published before the lock is released.
pub async fn admit(
    state: &SharedState,
    room_id: RoomId,
    player: &Player,
    difficulty: LiveDifficulty,
) -> Result<AdmissionReport, ServiceError> {
    state
        .run_exclusive(room_id, move || async move {
            let room = room_registry::get(state, room_id).await?;

            if !room.is_open {
                debug!(room_id, user_id = player.id, "join rejected: room closed");
                return Ok(AdmissionReport {
                    admission: Admission::RoomClosed,
                    room,
                    seated: false,
                });
            }

            let members = list(state, room_id).await?;
            if members.iter().any(|member| member.user_id == player.id) {
                debug!(room_id, user_id = player.id, "user already seated");
                return Ok(AdmissionReport {
                    admission: Admission::Admitted,
                    room,
                    seated: false,
                });
            }

            if room.joined_user_count >= room.max_user_count {
                debug!(room_id, user_id = player.id, "join rejected: room full");
                return Ok(AdmissionReport {
                    admission: Admission::RoomFull,
                    room,
                    seated: false,
                });
            }

            let mut tx = RoomTransaction::new(room_id);
            tx.push(RoomWrite::InsertMember(snapshot_member(
                room_id,
                player,
                difficulty,
                false,
                SystemTime::now(),
            )));
            let next = room_registry::stage_join(&mut tx, &room);
            state.bounded("commit", state.store().commit(tx)).await?;

            // Published under the lock so subscribers see seat counts in commit order.
            sse_events::broadcast_member_joined(state, &next, player.id);
            if !next.is_open {
                sse_events::broadcast_room_closed(state, &next);
            }

            info!(
                room_id,
                user_id = player.id,
                joined = next.joined_user_count,
                closed = !next.is_open,
                "user admitted"
            );
            Ok(AdmissionReport {
                admission: Admission::Admitted,
                room: next,
                seated: true,
            })
        })
        .await
}

/// Roster of the room in join order, host first. Empty for unknown rooms.
pub async fn list(state: &SharedState, room_id: RoomId) -> Result<Vec<MemberEntity>, ServiceError> {
    let members = state
        .bounded("find_members", state.store().find_members(room_id))
        .await?;
    Ok(host_first(members))
}

/// Identifier of the room's host, if the room exists.
pub async fn host_of(state: &SharedState, room_id: RoomId) -> Result<Option<UserId>, ServiceError> {
    let members = list(state, room_id).await?;
    Ok(members
        .iter()
        .find(|member| member.is_host)
        .map(|member| member.user_id))
}

/// Stable reorder putting the host in front; join order is kept otherwise.
pub fn host_first(mut members: Vec<MemberEntity>) -> Vec<MemberEntity> {
    members.sort_by_key(|member| !member.is_host);
    members
}
