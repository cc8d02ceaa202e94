//! Records returned by the persistent-store collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MessageId, RoomId, UserId};
use super::identity::UserIdentity;

/// A persisted message joined with its sender, with attachment paths
/// already turned into public URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message primary key.
    pub id: MessageId,
    /// Room the message was posted in.
    pub room_id: RoomId,
    /// Author.
    pub sender_id: UserId,
    /// Author's username.
    pub sender_username: String,
    /// Message text; empty only when an attachment is present.
    pub text: String,
    /// Public URL of the attached image.
    pub image_url: Option<String>,
    /// Public URL of the attached document.
    pub document_url: Option<String>,
    /// When the message was persisted.
    pub created_at: DateTime<Utc>,
}

/// Membership and presentation data of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRoster {
    /// Name shown to clients: the stored group name, or the member
    /// usernames joined with `" & "` for private rooms.
    pub display_name: String,
    /// Stored room flag.
    pub is_group: bool,
    /// Members in join order.
    pub members: Vec<UserIdentity>,
}
