//! PostgreSQL-backed implementation of the real-time collaborator traits.

use async_trait::async_trait;
use tracing::warn;

use chatline_core::result::AppResult;
use chatline_core::traits::{ChatStore, UserStore};
use chatline_core::types::{MessageId, MessageRecord, RoomId, RoomRoster, UserId, UserIdentity};

use crate::connection::DatabasePool;
use crate::repositories::{MessageRepository, RoomRepository, UserRepository};

/// Serves [`ChatStore`] and [`UserStore`] from the chat tables.
#[derive(Debug, Clone)]
pub struct DatabaseChatStore {
    users: UserRepository,
    rooms: RoomRepository,
    messages: MessageRepository,
    /// Public prefix for attachment URLs.
    media_url: String,
}

impl DatabaseChatStore {
    /// Build the store over an open pool.
    pub fn new(db: &DatabasePool, media_url: impl Into<String>) -> Self {
        let pool = db.pool().clone();
        Self {
            users: UserRepository::new(pool.clone()),
            rooms: RoomRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
            media_url: media_url.into(),
        }
    }
}

#[async_trait]
impl ChatStore for DatabaseChatStore {
    async fn get_message(&self, id: MessageId) -> AppResult<Option<MessageRecord>> {
        let Some(message) = self.messages.find_by_id(id).await? else {
            return Ok(None);
        };
        let Some(sender) = self.users.find_by_id(message.sender_id).await? else {
            warn!(message_id = %id, sender_id = %message.sender_id, "Message sender no longer exists");
            return Ok(None);
        };
        Ok(Some(message.to_record(sender.username, &self.media_url)))
    }

    async fn get_room_members(&self, room_id: RoomId) -> AppResult<Option<RoomRoster>> {
        let Some(room) = self.rooms.find_by_id(room_id).await? else {
            return Ok(None);
        };
        let members = self.rooms.find_members(room_id).await?;
        let usernames: Vec<&str> = members.iter().map(|u| u.username.as_str()).collect();

        Ok(Some(RoomRoster {
            display_name: room.display_name(&usernames),
            is_group: room.is_group,
            members: members.iter().map(|u| u.identity()).collect(),
        }))
    }
}

#[async_trait]
impl UserStore for DatabaseChatStore {
    async fn resolve_user(&self, id: UserId) -> AppResult<Option<UserIdentity>> {
        Ok(self.users.find_by_id(id).await?.map(|u| u.identity()))
    }
}
