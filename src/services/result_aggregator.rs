//! Session result aggregator: records one result per member and returns the room's
//! result set in join order.

use std::{collections::HashMap, time::SystemTime};

use tracing::{debug, info, warn};

use crate::{
    dao::{
        models::{MemberEntity, ResultEntity, RoomId},
        room_store::{RoomTransaction, RoomWrite},
    },
    error::ServiceError,
    services::{membership, sse_events},
    state::{
        SharedState,
        lobby::{Player, Submission},
    },
};

/// Record `player`'s result for `room_id`.
///
/// A second submission is reported as [`Submission::DuplicateSubmission`] and leaves the
/// first one untouched. Room and membership rows are never modified.
pub async fn submit(
    state: &SharedState,
    room_id: RoomId,
    player: &Player,
    judge_count_list: Vec<u32>,
    score: u32,
) -> Result<Submission, ServiceError> {
    state
        .run_exclusive(room_id, move || async move {
            let snapshot = state
                .bounded("room_snapshot", state.store().room_snapshot(room_id))
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))?;

            if !snapshot
                .members
                .iter()
                .any(|member| member.user_id == player.id)
            {
                warn!(room_id, user_id = player.id, "result from a non-member");
                return Err(ServiceError::Forbidden(format!(
                    "user `{}` is not a member of room `{room_id}`",
                    player.id
                )));
            }

            if snapshot
                .results
                .iter()
                .any(|result| result.user_id == player.id)
            {
                debug!(room_id, user_id = player.id, "duplicate result ignored");
                return Ok(Submission::DuplicateSubmission);
            }

            let mut tx = RoomTransaction::new(room_id);
            tx.push(RoomWrite::InsertResult(ResultEntity {
                room_id,
                user_id: player.id,
                judge_count_list,
                score,
                submitted_at: SystemTime::now(),
            }));
            state.bounded("commit", state.store().commit(tx)).await?;

            info!(room_id, user_id = player.id, score, "result recorded");
            sse_events::broadcast_result_submitted(state, room_id, player.id);
            Ok(Submission::Recorded)
        })
        .await
}

/// Results of the room in join order (host first). Members without a result are absent.
pub async fn results(state: &SharedState, room_id: RoomId) -> Result<Vec<ResultEntity>, ServiceError> {
    let snapshot = state
        .bounded("room_snapshot", state.store().room_snapshot(room_id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))?;

    Ok(order_by_membership(
        &membership::host_first(snapshot.members),
        snapshot.results,
    ))
}

/// Arrange `results` in the order of `members`, dropping rows without a membership.
pub fn order_by_membership(
    members: &[MemberEntity],
    results: Vec<ResultEntity>,
) -> Vec<ResultEntity> {
    let mut by_user = results
        .into_iter()
        .map(|result| (result.user_id, result))
        .collect::<HashMap<_, _>>();

    members
        .iter()
        .filter_map(|member| by_user.remove(&member.user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::LiveDifficulty, room_store::memory::MemoryRoomStore},
        services::room_registry,
        state::AppState,
    };

    fn state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryRoomStore::new()))
    }

    fn player(id: u64) -> Player {
        Player {
            id,
            name: format!("player-{id}"),
            leader_card_id: 3,
        }
    }

    async fn room_with_guests(state: &SharedState, guests: &[u64]) -> RoomId {
        let room = room_registry::create(state, 10, 4, &player(1), LiveDifficulty::Normal)
            .await
            .unwrap();
        for id in guests {
            membership::admit(state, room.id, &player(*id), LiveDifficulty::Normal)
                .await
                .unwrap();
        }
        room.id
    }

    #[tokio::test]
    async fn both_scores_are_returned_once() {
        let state = state();
        let room_id = room_with_guests(&state, &[2]).await;

        // Guest submits first; the result set still follows join order.
        assert_eq!(
            submit(&state, room_id, &player(2), vec![100, 20, 1], 1200)
                .await
                .unwrap(),
            Submission::Recorded
        );
        assert_eq!(
            submit(&state, room_id, &player(1), vec![90, 25, 6], 900)
                .await
                .unwrap(),
            Submission::Recorded
        );

        let results = results(&state, room_id).await.unwrap();
        let scores = results
            .iter()
            .map(|result| (result.user_id, result.score))
            .collect::<Vec<_>>();
        assert_eq!(scores, vec![(1, 900), (2, 1200)]);
        assert_eq!(results[1].judge_count_list, vec![100, 20, 1]);
    }

    #[tokio::test]
    async fn second_submission_is_a_duplicate() {
        let state = state();
        let room_id = room_with_guests(&state, &[]).await;

        submit(&state, room_id, &player(1), vec![1, 2, 3], 500)
            .await
            .unwrap();
        let again = submit(&state, room_id, &player(1), vec![3, 2, 1], 700)
            .await
            .unwrap();
        assert_eq!(again, Submission::DuplicateSubmission);

        let results = results(&state, room_id).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 500);
    }

    #[tokio::test]
    async fn missing_submissions_are_absent() {
        let state = state();
        let room_id = room_with_guests(&state, &[2, 3]).await;

        submit(&state, room_id, &player(3), vec![5], 300)
            .await
            .unwrap();

        let results = results(&state, room_id).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].user_id, 3);
        assert!(results.len() <= membership::list(&state, room_id).await.unwrap().len());
    }

    #[tokio::test]
    async fn outsiders_and_unknown_rooms_are_rejected() {
        let state = state();
        let room_id = room_with_guests(&state, &[]).await;

        let err = submit(&state, room_id, &player(9), vec![1], 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = submit(&state, 404, &player(1), vec![1], 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(state.room_locks().len(), 1);
        assert!(matches!(
            results(&state, 404).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn submission_leaves_room_untouched() {
        let state = state();
        let room_id = room_with_guests(&state, &[2]).await;
        let before = room_registry::get(&state, room_id).await.unwrap();

        submit(&state, room_id, &player(2), vec![1, 1], 10)
            .await
            .unwrap();

        assert_eq!(room_registry::get(&state, room_id).await.unwrap(), before);
    }
}
