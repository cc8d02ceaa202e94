//! Persistent-store collaborator traits.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{MessageId, MessageRecord, RoomId, RoomRoster, UserId, UserIdentity};

/// Read access to rooms, memberships, and messages.
#[async_trait]
pub trait ChatStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load a message with its sender. `Ok(None)` if it does not exist.
    async fn get_message(&self, id: MessageId) -> AppResult<Option<MessageRecord>>;

    /// Load a room's members and display name. `Ok(None)` if the room does
    /// not exist.
    async fn get_room_members(&self, room_id: RoomId) -> AppResult<Option<RoomRoster>>;
}

/// Read access to registered users.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a user id to its identity. `Ok(None)` if unknown.
    async fn resolve_user(&self, id: UserId) -> AppResult<Option<UserIdentity>>;
}
