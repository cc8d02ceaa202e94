//! Chat room entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use chatline_core::types::{RoomId, UserId};

/// Separator used when synthesizing a private room's display name.
pub const PRIVATE_NAME_SEPARATOR: &str = " & ";

/// Whether a room is a two-party conversation or a named group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// Exactly two members, unique per user pair.
    Private,
    /// Creator plus any number of members, with a stored name.
    Group,
}

/// A conversation container.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Stored group flag.
    pub is_group: bool,
    /// Display name (group rooms only).
    pub group_name: Option<String>,
    /// Creating user (group rooms only).
    pub created_by: Option<UserId>,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// Pairing key (private rooms only), see [`Room::private_key_for`].
    pub private_key: Option<String>,
}

impl Room {
    /// Deterministic pairing key for the private room between two users.
    ///
    /// The ids are sorted first, so both users derive the same key.
    pub fn private_key_for(a: UserId, b: UserId) -> String {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        format!("private_{low}_{high}")
    }

    /// Kind derived from the stored flag.
    pub fn kind(&self) -> RoomKind {
        if self.is_group {
            RoomKind::Group
        } else {
            RoomKind::Private
        }
    }

    /// Name shown to clients.
    ///
    /// Group rooms use the stored name. Private rooms join their members'
    /// usernames, in the order given, with `" & "`.
    pub fn display_name<S: AsRef<str>>(&self, member_usernames: &[S]) -> String {
        match (self.kind(), self.group_name.as_deref()) {
            (RoomKind::Group, Some(name)) => name.to_string(),
            _ => member_usernames
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(PRIVATE_NAME_SEPARATOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(is_group: bool, group_name: Option<&str>) -> Room {
        Room {
            id: RoomId(7),
            is_group,
            group_name: group_name.map(str::to_string),
            created_by: None,
            created_at: Utc::now(),
            private_key: None,
        }
    }

    #[test]
    fn test_private_key_is_order_independent() {
        assert_eq!(Room::private_key_for(UserId(9), UserId(3)), "private_3_9");
        assert_eq!(Room::private_key_for(UserId(3), UserId(9)), "private_3_9");
    }

    #[test]
    fn test_private_display_name_joins_usernames() {
        let room = room(false, None);
        assert_eq!(room.display_name(&["alice", "bob"]), "alice & bob");
    }

    #[test]
    fn test_group_display_name_uses_stored_name() {
        let room = room(true, Some("Weekend plans"));
        assert_eq!(room.display_name(&["alice", "bob", "carol"]), "Weekend plans");
        assert_eq!(room.kind(), RoomKind::Group);
    }
}
