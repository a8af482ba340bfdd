//! End-to-end room lifecycle against the in-memory store, driven through the public
//! service API.

use std::{sync::Arc, time::Duration};

use live_room_back::{
    config::AppConfig,
    dao::{models::LiveDifficulty, room_store::memory::MemoryRoomStore},
    error::ServiceError,
    services::{identity, membership, result_aggregator, room_registry, status_projector},
    state::{
        AppState, SharedState,
        lobby::{Admission, Player, RoomStatus, Submission},
    },
};

fn state() -> SharedState {
    AppState::new(AppConfig::default(), Arc::new(MemoryRoomStore::new()))
}

async fn register(state: &SharedState, name: &str) -> Player {
    let token = identity::create_user(state, name.into(), 1).await.unwrap();
    identity::resolve(state, &token).await.unwrap()
}

#[tokio::test]
async fn four_seat_room_fills_closes_and_rejects_the_fifth() {
    let state = state();
    let host = register(&state, "host").await;

    let room = room_registry::create(&state, 10, 4, &host, LiveDifficulty::Normal)
        .await
        .unwrap();
    assert_eq!(room.joined_user_count, 1);
    assert_eq!(
        status_projector::status(&state, room.id).await.unwrap(),
        RoomStatus::Waiting
    );

    for name in ["guest-a", "guest-b", "guest-c"] {
        let guest = register(&state, name).await;
        let report = membership::admit(&state, room.id, &guest, LiveDifficulty::Hard)
            .await
            .unwrap();
        assert_eq!(report.admission, Admission::Admitted);
    }

    assert_eq!(
        status_projector::status(&state, room.id).await.unwrap(),
        RoomStatus::InSession
    );
    assert!(room_registry::list(&state, 10).await.unwrap().is_empty());

    let late = register(&state, "late").await;
    let report = membership::admit(&state, room.id, &late, LiveDifficulty::Normal)
        .await
        .unwrap();
    assert_eq!(report.admission, Admission::RoomClosed);

    let view = status_projector::wait(&state, room.id).await.unwrap();
    assert_eq!(view.members.len(), 4);
    assert_eq!(view.members.iter().filter(|m| m.is_host).count(), 1);
    assert_eq!(view.members[0].user_id, host.id);
}

#[tokio::test]
async fn listing_an_unplayed_live_is_empty() {
    let state = state();
    assert!(room_registry::list(&state, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn two_players_submit_and_read_both_scores() {
    let state = state();
    let host = register(&state, "host").await;
    let guest = register(&state, "guest").await;

    let room = room_registry::create(&state, 10, 4, &host, LiveDifficulty::Normal)
        .await
        .unwrap();
    membership::admit(&state, room.id, &guest, LiveDifficulty::Normal)
        .await
        .unwrap();
    room_registry::start(&state, room.id, &host).await.unwrap();

    assert_eq!(
        result_aggregator::submit(&state, room.id, &host, vec![80, 10, 2], 900)
            .await
            .unwrap(),
        Submission::Recorded
    );
    assert_eq!(
        result_aggregator::submit(&state, room.id, &guest, vec![95, 4, 0], 1200)
            .await
            .unwrap(),
        Submission::Recorded
    );
    assert_eq!(
        result_aggregator::submit(&state, room.id, &guest, vec![0, 0, 0], 1)
            .await
            .unwrap(),
        Submission::DuplicateSubmission
    );

    let results = result_aggregator::results(&state, room.id).await.unwrap();
    let scores = results
        .iter()
        .map(|result| (result.user_id, result.score))
        .collect::<Vec<_>>();
    assert_eq!(scores, vec![(host.id, 900), (guest.id, 1200)]);
}

#[tokio::test]
async fn profile_update_does_not_rewrite_joined_rosters() {
    let state = state();
    let token = identity::create_user(&state, "before".into(), 5).await.unwrap();
    let host = identity::resolve(&state, &token).await.unwrap();

    let room = room_registry::create(&state, 1, 4, &host, LiveDifficulty::Normal)
        .await
        .unwrap();
    identity::update_user(&state, &token, "after".into(), 6)
        .await
        .unwrap();

    let members = membership::list(&state, room.id).await.unwrap();
    assert_eq!(members[0].name, "before");
    assert_eq!(members[0].leader_card_id, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_across_rooms_respect_each_capacity() {
    let state = state();
    let mut rooms = Vec::new();
    for host_id in 0..3u64 {
        let host = Player {
            id: 1000 + host_id,
            name: format!("host-{host_id}"),
            leader_card_id: 1,
        };
        let room = room_registry::create(&state, 42, 4, &host, LiveDifficulty::Normal)
            .await
            .unwrap();
        rooms.push(room.id);
    }

    let mut handles = Vec::new();
    for room_id in rooms.iter().copied() {
        for guest_id in 0..6u64 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                let guest = Player {
                    id: room_id * 100 + guest_id,
                    name: format!("guest-{guest_id}"),
                    leader_card_id: 1,
                };
                membership::admit(&state, room_id, &guest, LiveDifficulty::Normal)
                    .await
                    .unwrap()
                    .admission
            }));
        }
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() == Admission::Admitted {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 3 * 3);

    for room_id in rooms {
        let room = room_registry::get(&state, room_id).await.unwrap();
        assert_eq!(room.joined_user_count, 4);
        assert!(!room.is_open);
        assert_eq!(membership::list(&state, room_id).await.unwrap().len(), 4);
    }
}

#[tokio::test]
async fn held_room_lock_times_out_other_writers() {
    let config = AppConfig::default().with_operation_timeout(Duration::from_millis(50));
    let state = AppState::new(config, Arc::new(MemoryRoomStore::new()));
    let host = register(&state, "host").await;
    let room = room_registry::create(&state, 10, 4, &host, LiveDifficulty::Normal)
        .await
        .unwrap();

    let holder = state.clone();
    let room_id = room.id;
    let (locked_tx, locked_rx) = tokio::sync::oneshot::channel();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let blocker = tokio::spawn(async move {
        holder
            .run_exclusive(room_id, move || async move {
                let _ = locked_tx.send(());
                let _ = release_rx.await;
                Ok::<_, ServiceError>(())
            })
            .await
    });
    locked_rx.await.unwrap();

    let err = room_registry::close(&state, room_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Timeout));

    release_tx.send(()).unwrap();
    blocker.await.unwrap().unwrap();
    assert!(room_registry::close(&state, room_id).await.unwrap());
}
