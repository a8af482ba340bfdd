//! Shared application state: storage handle, per-room locks and the room event hub.

pub mod lobby;
mod room_locks;
mod sse;

use std::{future::Future, sync::Arc};

use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::{
        models::RoomId,
        room_store::RoomStore,
        storage::{StorageError, StorageResult},
    },
    error::ServiceError,
};

pub use self::room_locks::{RoomLock, RoomLocks};
pub use self::sse::SseHub;

/// Handle to the application state shared by handlers and services.
pub type SharedState = Arc<AppState>;

/// Central application state: storage handle, per-room locks and the event hub.
pub struct AppState {
    store: Arc<dyn RoomStore>,
    config: AppConfig,
    room_locks: RoomLocks,
    room_events: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn RoomStore>) -> SharedState {
        Arc::new(Self {
            store,
            room_events: SseHub::new(config.event_buffer()),
            config,
            room_locks: RoomLocks::new(),
        })
    }

    /// Storage backend shared by every service.
    pub fn store(&self) -> &dyn RoomStore {
        self.store.as_ref()
    }

    /// Runtime configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Per-room lock table.
    pub fn room_locks(&self) -> &RoomLocks {
        &self.room_locks
    }

    /// Broadcast hub used for the room events SSE stream.
    pub fn room_events(&self) -> &SseHub {
        &self.room_events
    }

    /// Run a storage call, failing with [`StorageError::Timeout`] past the configured limit.
    pub async fn bounded<T, Fut>(&self, operation: &'static str, call: Fut) -> StorageResult<T>
    where
        Fut: Future<Output = StorageResult<T>>,
    {
        match timeout(self.config.operation_timeout(), call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, "storage operation timed out");
                Err(StorageError::Timeout { operation })
            }
        }
    }

    /// Run `work` while holding the lock of `room_id`.
    ///
    /// Rooms without a registered lock are looked up in the store first; unknown rooms fail
    /// with [`ServiceError::NotFound`] without touching the lock table. Waiting for the lock
    /// is bounded by the operation timeout. Once acquired, the work runs to completion:
    /// storage calls inside it carry their own limits.
    pub async fn run_exclusive<F, Fut, T>(&self, room_id: RoomId, work: F) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let lock = match self.room_locks.get(room_id) {
            Some(lock) => lock,
            None => {
                let room = self
                    .bounded("find_room", self.store.find_room(room_id))
                    .await?;
                if room.is_none() {
                    return Err(ServiceError::NotFound(format!("room `{room_id}` not found")));
                }
                self.room_locks.register(room_id)
            }
        };
        self.run_locked(room_id, lock, work).await
    }

    /// Run the creation of `room_id` under its lock.
    ///
    /// The lock is registered up front and dropped again if `work` fails, so only rooms
    /// that were committed keep an entry.
    pub async fn run_creating<F, Fut, T>(&self, room_id: RoomId, work: F) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let lock = self.room_locks.register(room_id);
        let outcome = self.run_locked(room_id, lock, work).await;
        if outcome.is_err() {
            self.room_locks.forget(room_id);
        }
        outcome
    }

    async fn run_locked<F, Fut, T>(
        &self,
        room_id: RoomId,
        lock: RoomLock,
        work: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let limit = self.config.operation_timeout();
        let gate = match timeout(limit, lock.lock_owned()).await {
            Ok(gate) => gate,
            Err(_) => {
                warn!(room_id, "timed out waiting for the room lock");
                return Err(ServiceError::Timeout);
            }
        };

        let outcome = work().await;
        drop(gate);
        outcome
    }
}
