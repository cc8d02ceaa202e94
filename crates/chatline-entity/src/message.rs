//! Message entity model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use chatline_core::types::{MessageId, MessageRecord, RoomId, UserId};

/// Users who have read a message. Membership only; order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadReceipts(BTreeSet<UserId>);

impl ReadReceipts {
    /// Record that `user` has read the message. Returns `false` if already
    /// recorded.
    pub fn mark(&mut self, user: UserId) -> bool {
        self.0.insert(user)
    }

    /// Whether `user` has read the message.
    pub fn contains(&self, user: UserId) -> bool {
        self.0.contains(&user)
    }

    /// Number of readers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nobody has read the message yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A message posted in a room.
///
/// Messages within a room are ordered by `(created_at, id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Room the message belongs to.
    pub room_id: RoomId,
    /// Author.
    pub sender_id: UserId,
    /// Message text.
    pub message: String,
    /// Stored path of the attached image.
    pub image: Option<String>,
    /// Stored path of the attached document.
    pub document: Option<String>,
    /// Readers.
    pub read_by: Json<ReadReceipts>,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether the message carries an image or a document.
    pub fn has_attachment(&self) -> bool {
        self.image.is_some() || self.document.is_some()
    }

    /// Text may only be empty when an attachment is present.
    pub fn is_well_formed(&self) -> bool {
        !self.message.trim().is_empty() || self.has_attachment()
    }

    /// Record `user` as a reader. The author never counts as a reader.
    pub fn mark_read(&mut self, user: UserId) -> bool {
        if user == self.sender_id {
            return false;
        }
        self.read_by.0.mark(user)
    }

    /// Whether `user` has read this message.
    pub fn is_read_by(&self, user: UserId) -> bool {
        self.read_by.0.contains(user)
    }

    /// Convert into the record handed to the real-time core.
    ///
    /// `media_url` is the public prefix attachments are served under.
    pub fn to_record(&self, sender_username: impl Into<String>, media_url: &str) -> MessageRecord {
        MessageRecord {
            id: self.id,
            room_id: self.room_id,
            sender_id: self.sender_id,
            sender_username: sender_username.into(),
            text: self.message.clone(),
            image_url: self.image.as_deref().map(|p| media_path(media_url, p)),
            document_url: self.document.as_deref().map(|p| media_path(media_url, p)),
            created_at: self.created_at,
        }
    }
}

fn media_path(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str, image: Option<&str>) -> Message {
        Message {
            id: MessageId(42),
            room_id: RoomId(7),
            sender_id: UserId(1),
            message: text.to_string(),
            image: image.map(str::to_string),
            document: None,
            read_by: Json(ReadReceipts::default()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_text_requires_attachment() {
        assert!(message("hi", None).is_well_formed());
        assert!(!message("  ", None).is_well_formed());
        assert!(message("", Some("images/cat.png")).is_well_formed());
    }

    #[test]
    fn test_mark_read_is_idempotent_and_skips_sender() {
        let mut msg = message("hi", None);
        assert!(!msg.mark_read(UserId(1)));
        assert!(msg.mark_read(UserId(2)));
        assert!(!msg.mark_read(UserId(2)));
        assert!(msg.is_read_by(UserId(2)));
        assert_eq!(msg.read_by.0.len(), 1);
    }

    #[test]
    fn test_record_builds_attachment_urls() {
        let record = message("", Some("images/cat.png")).to_record("u1", "/media/");
        assert_eq!(record.image_url.as_deref(), Some("/media/images/cat.png"));
        assert_eq!(record.document_url, None);
        assert_eq!(record.sender_username, "u1");
    }

    #[test]
    fn test_read_receipts_serialize_as_array() {
        let mut receipts = ReadReceipts::default();
        receipts.mark(UserId(5));
        receipts.mark(UserId(2));
        assert_eq!(serde_json::to_string(&receipts).unwrap(), "[2,5]");
    }
}
