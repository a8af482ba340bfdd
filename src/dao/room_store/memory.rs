//! In-process storage engine backing the [`RoomStore`] trait.
//!
//! Each room lives in a single record (room row, memberships and results), so a
//! transaction only ever locks the map shard holding that room. Commits stage their
//! writes on a copy of the record and swap it in once every precondition held.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::dao::{
    models::{
        MemberEntity, ResultEntity, RoomEntity, RoomId, RoomSnapshot, UserEntity, UserId,
    },
    room_store::{RoomStore, RoomTransaction, RoomWrite},
    storage::{StorageError, StorageResult},
};

/// Room store kept in process memory. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: DashMap<String, UserEntity>,
    rooms: DashMap<RoomId, RoomRecord>,
    last_user_id: AtomicU64,
    last_room_id: AtomicU64,
}

#[derive(Debug, Clone)]
struct RoomRecord {
    room: RoomEntity,
    members: IndexMap<UserId, MemberEntity>,
    results: IndexMap<UserId, ResultEntity>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomRecord {
    fn new(room: RoomEntity) -> Self {
        Self {
            room,
            members: IndexMap::new(),
            results: IndexMap::new(),
        }
    }

    fn apply(&mut self, room_id: RoomId, write: RoomWrite) -> StorageResult<()> {
        match write {
            RoomWrite::InsertRoom(room) => Err(StorageError::conflict(format!(
                "room `{}` already exists",
                room.id
            ))),
            RoomWrite::UpdateRoom {
                expected_joined,
                room,
            } => {
                ensure_scope(room_id, room.id)?;
                if self.room.joined_user_count != expected_joined {
                    return Err(StorageError::conflict(format!(
                        "room `{room_id}` joined count is {} (expected {expected_joined})",
                        self.room.joined_user_count
                    )));
                }
                self.room = room;
                Ok(())
            }
            RoomWrite::InsertMember(member) => {
                ensure_scope(room_id, member.room_id)?;
                if self.members.contains_key(&member.user_id) {
                    return Err(StorageError::conflict(format!(
                        "user `{}` is already a member of room `{room_id}`",
                        member.user_id
                    )));
                }
                if member.is_host && self.members.values().any(|m| m.is_host) {
                    return Err(StorageError::conflict(format!(
                        "room `{room_id}` already has a host"
                    )));
                }
                self.members.insert(member.user_id, member);
                Ok(())
            }
            RoomWrite::InsertResult(result) => {
                ensure_scope(room_id, result.room_id)?;
                if !self.members.contains_key(&result.user_id) {
                    return Err(StorageError::conflict(format!(
                        "user `{}` is not a member of room `{room_id}`",
                        result.user_id
                    )));
                }
                if self.results.contains_key(&result.user_id) {
                    return Err(StorageError::conflict(format!(
                        "user `{}` already has a result in room `{room_id}`",
                        result.user_id
                    )));
                }
                self.results.insert(result.user_id, result);
                Ok(())
            }
        }
    }

    /// Invariants every committed record must satisfy.
    fn check(&self) -> StorageResult<()> {
        let joined = self.room.joined_user_count as usize;
        if joined != self.members.len() {
            return Err(StorageError::conflict(format!(
                "room `{}` joined count {joined} does not match {} memberships",
                self.room.id,
                self.members.len()
            )));
        }
        if self.room.joined_user_count > self.room.max_user_count {
            return Err(StorageError::conflict(format!(
                "room `{}` exceeds its capacity of {}",
                self.room.id, self.room.max_user_count
            )));
        }
        Ok(())
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room: self.room.clone(),
            members: self.members.values().cloned().collect(),
            results: self.results.values().cloned().collect(),
        }
    }
}

fn ensure_scope(room_id: RoomId, row_room_id: RoomId) -> StorageResult<()> {
    if room_id == row_room_id {
        Ok(())
    } else {
        Err(StorageError::conflict(format!(
            "write for room `{row_room_id}` staged in a transaction for room `{room_id}`"
        )))
    }
}

impl MemoryInner {
    fn commit(&self, transaction: RoomTransaction) -> StorageResult<()> {
        if transaction.is_empty() {
            return Ok(());
        }

        let room_id = transaction.room_id();
        let mut writes = transaction.into_writes().into_iter();

        match self.rooms.entry(room_id) {
            Entry::Occupied(mut slot) => {
                let mut staged = slot.get().clone();
                for write in writes {
                    staged.apply(room_id, write)?;
                }
                staged.check()?;
                *slot.get_mut() = staged;
            }
            Entry::Vacant(slot) => {
                let Some(RoomWrite::InsertRoom(room)) = writes.next() else {
                    return Err(StorageError::conflict(format!(
                        "room `{room_id}` does not exist"
                    )));
                };
                ensure_scope(room_id, room.id)?;
                let mut staged = RoomRecord::new(room);
                for write in writes {
                    staged.apply(room_id, write)?;
                }
                staged.check()?;
                slot.insert(staged);
            }
        }

        Ok(())
    }
}

impl RoomStore for MemoryRoomStore {
    fn insert_user(
        &self,
        name: String,
        token: String,
        leader_card_id: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            match inner.users.entry(token.clone()) {
                Entry::Occupied(_) => Err(StorageError::conflict("user token already issued")),
                Entry::Vacant(slot) => {
                    let user = UserEntity {
                        id: inner.last_user_id.fetch_add(1, Ordering::SeqCst) + 1,
                        token,
                        name,
                        leader_card_id,
                    };
                    slot.insert(user.clone());
                    Ok(user)
                }
            }
        })
    }

    fn find_user_by_token(
        &self,
        token: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.users.get(&token).map(|entry| entry.value().clone())) })
    }

    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            match inner.users.get_mut(&user.token) {
                Some(mut existing) if existing.id == user.id => {
                    *existing = user;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn allocate_room_id(&self) -> BoxFuture<'static, StorageResult<RoomId>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.last_room_id.fetch_add(1, Ordering::SeqCst) + 1) })
    }

    fn find_room(&self, id: RoomId) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.rooms.get(&id).map(|record| record.room.clone())) })
    }

    fn list_open_rooms(&self, live_id: u32) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut rooms = inner
                .rooms
                .iter()
                .filter(|record| record.room.live_id == live_id && record.room.is_open)
                .map(|record| record.room.clone())
                .collect::<Vec<_>>();
            rooms.sort_unstable_by_key(|room| room.id);
            Ok(rooms)
        })
    }

    fn find_members(
        &self,
        room_id: RoomId,
    ) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .rooms
                .get(&room_id)
                .map(|record| record.members.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn room_snapshot(
        &self,
        room_id: RoomId,
    ) -> BoxFuture<'static, StorageResult<Option<RoomSnapshot>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.rooms.get(&room_id).map(|record| record.snapshot())) })
    }

    fn commit(&self, transaction: RoomTransaction) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.commit(transaction) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::LiveDifficulty;

    fn room(id: RoomId, live_id: u32, joined: u32, is_open: bool) -> RoomEntity {
        RoomEntity {
            id,
            live_id,
            max_user_count: 4,
            joined_user_count: joined,
            is_open,
            started: false,
            created_at: SystemTime::now(),
        }
    }

    fn member(room_id: RoomId, user_id: UserId, is_host: bool) -> MemberEntity {
        MemberEntity {
            room_id,
            user_id,
            name: format!("user-{user_id}"),
            leader_card_id: 1,
            select_difficulty: LiveDifficulty::Normal,
            is_host,
            joined_at: SystemTime::now(),
        }
    }

    fn result(room_id: RoomId, user_id: UserId, score: u32) -> ResultEntity {
        ResultEntity {
            room_id,
            user_id,
            judge_count_list: vec![10, 2, 0],
            score,
            submitted_at: SystemTime::now(),
        }
    }

    async fn seed_room(store: &MemoryRoomStore, id: RoomId, live_id: u32) {
        let mut tx = RoomTransaction::new(id);
        tx.push(RoomWrite::InsertRoom(room(id, live_id, 1, true)));
        tx.push(RoomWrite::InsertMember(member(id, 1, true)));
        store.commit(tx).await.unwrap();
    }

    #[tokio::test]
    async fn commit_creates_room_with_host() {
        let store = MemoryRoomStore::new();
        seed_room(&store, 1, 10).await;

        let snapshot = store.room_snapshot(1).await.unwrap().unwrap();
        assert_eq!(snapshot.room.joined_user_count, 1);
        assert_eq!(snapshot.members.len(), 1);
        assert!(snapshot.members[0].is_host);
        assert!(snapshot.results.is_empty());
    }

    #[tokio::test]
    async fn commit_rejects_room_without_matching_members() {
        let store = MemoryRoomStore::new();
        let mut tx = RoomTransaction::new(1);
        tx.push(RoomWrite::InsertRoom(room(1, 10, 1, true)));

        let err = store.commit(tx).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
        assert!(store.find_room(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_write_leaves_record_untouched() {
        let store = MemoryRoomStore::new();
        seed_room(&store, 1, 10).await;

        let mut tx = RoomTransaction::new(1);
        tx.push(RoomWrite::UpdateRoom {
            expected_joined: 1,
            room: room(1, 10, 2, true),
        });
        tx.push(RoomWrite::InsertMember(member(1, 2, false)));
        // Same user twice: the whole transaction must be discarded.
        tx.push(RoomWrite::InsertMember(member(1, 2, false)));

        assert!(store.commit(tx).await.is_err());
        let snapshot = store.room_snapshot(1).await.unwrap().unwrap();
        assert_eq!(snapshot.room.joined_user_count, 1);
        assert_eq!(snapshot.members.len(), 1);
    }

    #[tokio::test]
    async fn update_requires_expected_joined_count() {
        let store = MemoryRoomStore::new();
        seed_room(&store, 1, 10).await;

        let mut tx = RoomTransaction::new(1);
        tx.push(RoomWrite::UpdateRoom {
            expected_joined: 2,
            room: room(1, 10, 3, true),
        });

        let err = store.commit(tx).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn second_host_is_rejected() {
        let store = MemoryRoomStore::new();
        seed_room(&store, 1, 10).await;

        let mut tx = RoomTransaction::new(1);
        tx.push(RoomWrite::UpdateRoom {
            expected_joined: 1,
            room: room(1, 10, 2, true),
        });
        tx.push(RoomWrite::InsertMember(member(1, 2, true)));

        assert!(store.commit(tx).await.is_err());
    }

    #[tokio::test]
    async fn results_require_membership_and_are_unique() {
        let store = MemoryRoomStore::new();
        seed_room(&store, 1, 10).await;

        let mut stranger = RoomTransaction::new(1);
        stranger.push(RoomWrite::InsertResult(result(1, 99, 100)));
        assert!(store.commit(stranger).await.is_err());

        let mut first = RoomTransaction::new(1);
        first.push(RoomWrite::InsertResult(result(1, 1, 900)));
        store.commit(first).await.unwrap();

        let mut again = RoomTransaction::new(1);
        again.push(RoomWrite::InsertResult(result(1, 1, 1200)));
        assert!(store.commit(again).await.is_err());

        let snapshot = store.room_snapshot(1).await.unwrap().unwrap();
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.results[0].score, 900);
    }

    #[tokio::test]
    async fn transaction_for_unknown_room_fails() {
        let store = MemoryRoomStore::new();
        let mut tx = RoomTransaction::new(7);
        tx.push(RoomWrite::InsertMember(member(7, 1, false)));

        assert!(store.commit(tx).await.is_err());
    }

    #[tokio::test]
    async fn list_returns_open_rooms_in_creation_order() {
        let store = MemoryRoomStore::new();
        for id in [3, 1, 2] {
            seed_room(&store, id, 10).await;
        }
        seed_room(&store, 4, 11).await;

        let mut close = RoomTransaction::new(2);
        close.push(RoomWrite::UpdateRoom {
            expected_joined: 1,
            room: room(2, 10, 1, false),
        });
        store.commit(close).await.unwrap();

        let ids = store
            .list_open_rooms(10)
            .await
            .unwrap()
            .into_iter()
            .map(|room| room.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 3]);
        assert!(store.list_open_rooms(12).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_are_keyed_by_token() {
        let store = MemoryRoomStore::new();
        let alice = store
            .insert_user("alice".into(), "token-a".into(), 5)
            .await
            .unwrap();
        let bob = store
            .insert_user("bob".into(), "token-b".into(), 6)
            .await
            .unwrap();
        assert_ne!(alice.id, bob.id);
        assert!(
            store
                .insert_user("eve".into(), "token-a".into(), 1)
                .await
                .is_err()
        );

        let renamed = UserEntity {
            name: "alicia".into(),
            ..alice.clone()
        };
        assert!(store.update_user(renamed).await.unwrap());
        let found = store
            .find_user_by_token("token-a".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "alicia");
        assert!(
            store
                .find_user_by_token("missing".into())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn room_ids_are_never_reused() {
        let store = MemoryRoomStore::new();
        let first = store.allocate_room_id().await.unwrap();
        let second = store.allocate_room_id().await.unwrap();
        assert!(second > first);
    }
}
