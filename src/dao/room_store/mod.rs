//! Room persistence seam.

/// In-process engine.
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::models::{MemberEntity, ResultEntity, RoomEntity, RoomId, RoomSnapshot, UserEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for users, rooms, memberships and results.
///
/// Reads are plain lookups. Every room mutation goes through [`RoomStore::commit`], which
/// must apply a [`RoomTransaction`] entirely or not at all.
pub trait RoomStore: Send + Sync {
    /// Register a user under the given credential, assigning the next id.
    fn insert_user(
        &self,
        name: String,
        token: String,
        leader_card_id: u32,
    ) -> BoxFuture<'static, StorageResult<UserEntity>>;
    /// User owning `token`, if any.
    fn find_user_by_token(&self, token: String)
    -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Replace the profile of an existing user, returning `false` when the id is unknown.
    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Reserve the next room id. Ids are never handed out twice.
    fn allocate_room_id(&self) -> BoxFuture<'static, StorageResult<RoomId>>;
    /// Room row by id.
    fn find_room(&self, id: RoomId) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Open rooms for the live, in creation order.
    fn list_open_rooms(&self, live_id: u32) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>>;
    /// Memberships of the room in join order; empty when the room is unknown.
    fn find_members(&self, room_id: RoomId) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>>;
    /// Room, memberships and results read atomically.
    fn room_snapshot(&self, room_id: RoomId)
    -> BoxFuture<'static, StorageResult<Option<RoomSnapshot>>>;
    /// Apply every write of `transaction` or none of them.
    fn commit(&self, transaction: RoomTransaction) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round trip used by the health route.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Single write staged inside a [`RoomTransaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomWrite {
    /// Create the room row. Fails if the id is taken.
    InsertRoom(RoomEntity),
    /// Replace the room row if its joined count still equals `expected_joined`.
    UpdateRoom {
        /// Joined count the stored row must still carry.
        expected_joined: u32,
        /// Replacement row.
        room: RoomEntity,
    },
    /// Append a membership. Fails if `(room_id, user_id)` exists.
    InsertMember(MemberEntity),
    /// Record a result. Fails if `(room_id, user_id)` exists or is not a member.
    InsertResult(ResultEntity),
}

/// Ordered set of writes scoped to a single room.
///
/// Components stage their own rows; the caller commits once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTransaction {
    room_id: RoomId,
    writes: Vec<RoomWrite>,
}

impl RoomTransaction {
    /// Start an empty transaction for `room_id`.
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            writes: Vec::new(),
        }
    }

    /// Room every write targets.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Stage a write. Writes are applied in staging order.
    pub fn push(&mut self, write: RoomWrite) {
        self.writes.push(write);
    }

    /// Whether nothing was staged.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Staged writes in order.
    pub fn writes(&self) -> &[RoomWrite] {
        &self.writes
    }

    /// Consume the transaction into its writes.
    pub fn into_writes(self) -> Vec<RoomWrite> {
        self.writes
    }
}
