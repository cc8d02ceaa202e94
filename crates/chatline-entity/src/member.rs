//! Room membership entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use chatline_core::types::{RoomId, UserId};

/// A `(room, user)` pair, unique together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomMember {
    /// Room joined.
    pub room_id: RoomId,
    /// Member.
    pub user_id: UserId,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
}
