//! Process-local store backend.
//!
//! Holds users, rooms, memberships, and messages in concurrent maps. Used
//! when `database.provider = "memory"` and as the store in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::types::Json;

use chatline_core::error::AppError;
use chatline_core::result::AppResult;
use chatline_core::traits::{ChatStore, UserStore};
use chatline_core::types::{MessageId, MessageRecord, RoomId, RoomRoster, UserId, UserIdentity};
use chatline_entity::{Message, ReadReceipts, Room, User};

/// In-memory chat tables.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    users: Arc<DashMap<UserId, User>>,
    rooms: Arc<DashMap<RoomId, Room>>,
    /// Member ids per room, in join order.
    members: Arc<DashMap<RoomId, Vec<UserId>>>,
    messages: Arc<DashMap<MessageId, Message>>,
    next_message_id: Arc<AtomicI64>,
    media_url: String,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(media_url: impl Into<String>) -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            rooms: Arc::new(DashMap::new()),
            members: Arc::new(DashMap::new()),
            messages: Arc::new(DashMap::new()),
            next_message_id: Arc::new(AtomicI64::new(1)),
            media_url: media_url.into(),
        }
    }

    /// Register a user.
    pub fn insert_user(&self, id: UserId, username: impl Into<String>) -> User {
        let username = username.into();
        let user = User {
            id,
            email: format!("{username}@chatline.local"),
            username,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        user
    }

    /// Create the private room for two users, or return the existing one.
    pub fn insert_private_room(&self, id: RoomId, a: UserId, b: UserId) -> Room {
        let key = Room::private_key_for(a, b);
        if let Some(existing) = self
            .rooms
            .iter()
            .find(|r| r.private_key.as_deref() == Some(key.as_str()))
        {
            return existing.clone();
        }

        let room = Room {
            id,
            is_group: false,
            group_name: None,
            created_by: None,
            created_at: Utc::now(),
            private_key: Some(key),
        };
        self.rooms.insert(room.id, room.clone());
        self.add_member(room.id, a);
        self.add_member(room.id, b);
        room
    }

    /// Create a named group room. The creator becomes its first member.
    pub fn insert_group_room(
        &self,
        id: RoomId,
        name: impl Into<String>,
        created_by: UserId,
    ) -> Room {
        let room = Room {
            id,
            is_group: true,
            group_name: Some(name.into()),
            created_by: Some(created_by),
            created_at: Utc::now(),
            private_key: None,
        };
        self.rooms.insert(room.id, room.clone());
        self.add_member(room.id, created_by);
        room
    }

    /// Add a member. Returns `false` if already a member.
    pub fn add_member(&self, room_id: RoomId, user_id: UserId) -> bool {
        let mut members = self.members.entry(room_id).or_default();
        if members.contains(&user_id) {
            return false;
        }
        members.push(user_id);
        true
    }

    /// Persist a message and return it with its assigned id.
    pub fn insert_message(
        &self,
        room_id: RoomId,
        sender_id: UserId,
        text: impl Into<String>,
    ) -> AppResult<Message> {
        let id = MessageId(self.next_message_id.fetch_add(1, Ordering::Relaxed));
        self.insert_message_with_id(id, room_id, sender_id, text)
    }

    /// Persist a message under a caller-chosen id.
    pub fn insert_message_with_id(
        &self,
        id: MessageId,
        room_id: RoomId,
        sender_id: UserId,
        text: impl Into<String>,
    ) -> AppResult<Message> {
        if !self.rooms.contains_key(&room_id) {
            return Err(AppError::not_found(format!("Room {room_id} not found")));
        }
        let message = Message {
            id,
            room_id,
            sender_id,
            message: text.into(),
            image: None,
            document: None,
            read_by: Json(ReadReceipts::default()),
            created_at: Utc::now(),
        };
        if !message.is_well_formed() {
            return Err(AppError::validation(
                "Message text may only be empty when an attachment is present",
            ));
        }
        self.next_message_id.fetch_max(id.get() + 1, Ordering::Relaxed);
        self.messages.insert(id, message.clone());
        Ok(message)
    }

    /// Remove a message. Returns whether it existed.
    pub fn delete_message(&self, id: MessageId) -> bool {
        self.messages.remove(&id).is_some()
    }

    /// Record `user_id` as a reader of the message.
    pub fn mark_read(&self, id: MessageId, user_id: UserId) -> AppResult<bool> {
        let mut message = self
            .messages
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Message {id} not found")))?;
        Ok(message.mark_read(user_id))
    }

    /// Messages of a room ordered by `(created_at, id)`.
    pub fn room_history(&self, room_id: RoomId) -> Vec<Message> {
        let mut history: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .map(|m| m.clone())
            .collect();
        history.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        history
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("/media/")
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn get_message(&self, id: MessageId) -> AppResult<Option<MessageRecord>> {
        let Some(message) = self.messages.get(&id).map(|m| m.clone()) else {
            return Ok(None);
        };
        let Some(sender) = self.users.get(&message.sender_id).map(|u| u.username.clone()) else {
            return Ok(None);
        };
        Ok(Some(message.to_record(sender, &self.media_url)))
    }

    async fn get_room_members(&self, room_id: RoomId) -> AppResult<Option<RoomRoster>> {
        let Some(room) = self.rooms.get(&room_id).map(|r| r.clone()) else {
            return Ok(None);
        };
        let member_ids = self
            .members
            .get(&room_id)
            .map(|m| m.clone())
            .unwrap_or_default();
        let members: Vec<UserIdentity> = member_ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.identity()))
            .collect();
        let usernames: Vec<&str> = members.iter().map(|m| m.username.as_str()).collect();

        Ok(Some(RoomRoster {
            display_name: room.display_name(&usernames),
            is_group: room.is_group,
            members,
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn resolve_user(&self, id: UserId) -> AppResult<Option<UserIdentity>> {
        Ok(self.users.get(&id).map(|u| u.identity()))
    }
}
