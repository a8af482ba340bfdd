use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::dao::models::RoomId;

/// Handle to the mutex of one room.
pub type RoomLock = Arc<Mutex<()>>;

/// Table of per-room mutexes. Rooms never share a lock.
///
/// Entries only exist for rooms that were created or found in the store, so ids sent by
/// clients for rooms that do not exist never grow the table.
#[derive(Default)]
pub struct RoomLocks {
    locks: DashMap<RoomId, RoomLock>,
}

impl RoomLocks {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of an already registered room.
    pub fn get(&self, room_id: RoomId) -> Option<RoomLock> {
        self.locks.get(&room_id).map(|entry| entry.value().clone())
    }

    /// Register `room_id` (known to exist or about to be created) and return its handle.
    pub fn register(&self, room_id: RoomId) -> RoomLock {
        self.locks.entry(room_id).or_default().clone()
    }

    /// Drop the entry of a room whose creation did not commit.
    pub fn forget(&self, room_id: RoomId) {
        self.locks.remove(&room_id);
    }

    /// Number of registered rooms.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no room has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn same_room_is_exclusive() {
        let locks = RoomLocks::new();
        let guard = locks.register(1).lock_owned().await;

        let handle = locks.get(1).unwrap();
        let second = timeout(Duration::from_millis(50), handle.clone().lock_owned()).await;
        assert!(second.is_err(), "second acquire must wait");

        drop(guard);
        let third = timeout(Duration::from_millis(50), handle.lock_owned()).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn different_rooms_do_not_contend() {
        let locks = RoomLocks::new();
        let _first = locks.register(1).lock_owned().await;

        let other = timeout(Duration::from_millis(50), locks.register(2).lock_owned()).await;
        assert!(other.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn lookup_never_inserts() {
        let locks = RoomLocks::new();
        assert!(locks.get(7).is_none());
        assert!(locks.is_empty());

        locks.register(7);
        locks.forget(7);
        assert!(locks.is_empty());
    }
}
