//! Inbound and outbound WebSocket frame definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use chatline_core::types::{MessageId, MessageRecord, RoomId, UserId};

/// A client request to fan out an already-persisted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientFrame {
    /// Room the message was posted in.
    pub room_id: RoomId,
    /// The persisted message.
    pub message_id: MessageId,
}

/// Clients send ids either as JSON numbers or as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reference {
    Number(i64),
    Text(String),
}

impl Reference {
    fn resolve(self) -> Option<i64> {
        let id = match self {
            Self::Number(n) => n,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        (id > 0).then_some(id)
    }

    fn take(fields: &mut Map<String, Value>, key: &str) -> Option<i64> {
        let value = fields.remove(key)?;
        serde_json::from_value::<Self>(value).ok()?.resolve()
    }
}

impl ClientFrame {
    /// Parse a text frame. Returns `None` for anything that is not a JSON
    /// object carrying both references.
    pub fn parse(raw: &str) -> Option<Self> {
        // Only objects qualify; arrays must not bind positionally.
        let mut fields: Map<String, Value> = serde_json::from_str(raw).ok()?;
        Some(Self {
            room_id: RoomId(Reference::take(&mut fields, "room_id")?),
            message_id: MessageId(Reference::take(&mut fields, "message_id")?),
        })
    }
}

/// Events pushed from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full message delivery, sent to every room member.
    #[serde(rename = "message")]
    Delivery(DeliveryEvent),
    /// Short notice, sent to every room member except the sender.
    Notification(NotificationEvent),
}

impl ServerEvent {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Message payload plus the room presentation fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    /// Message id.
    pub id: MessageId,
    /// Room id.
    pub room_id: RoomId,
    /// Author id.
    pub sender_id: UserId,
    /// Author username.
    pub sender_username: String,
    /// Message text.
    pub message: String,
    /// Attached image URL.
    pub image_url: Option<String>,
    /// Attached document URL.
    pub document_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Room display name.
    pub room_name: String,
    /// Whether clients should render the room as a group.
    pub is_group: bool,
}

impl DeliveryEvent {
    /// Build from a persisted message and its room's presentation.
    pub fn new(
        record: &MessageRecord,
        room_id: RoomId,
        room_name: impl Into<String>,
        is_group: bool,
    ) -> Self {
        Self {
            id: record.id,
            room_id,
            sender_id: record.sender_id,
            sender_username: record.sender_username.clone(),
            message: record.text.clone(),
            image_url: record.image_url.clone(),
            document_url: record.document_url.clone(),
            created_at: record.created_at,
            room_name: room_name.into(),
            is_group,
        }
    }
}

/// Notice that a message arrived in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Room id.
    pub room_id: RoomId,
    /// Room display name.
    pub room_name: String,
    /// Author username.
    pub sender_username: String,
    /// Message text.
    pub message: String,
}
