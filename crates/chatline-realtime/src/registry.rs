//! Membership registry: user id → that user's live connections.
//!
//! A user's entry (the delivery group) is created on first subscribe and
//! removed when its last connection unsubscribes. Every mutation of a group
//! happens under the owning shard's write lock, so a group is never observed
//! empty and a connection is never counted twice.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use chatline_core::types::UserId;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::ServerEvent;

/// Live connections of one user.
type DeliveryGroup = HashMap<ConnectionId, Arc<ConnectionHandle>>;

/// Process-wide map of delivery groups.
#[derive(Debug, Default)]
pub struct MembershipRegistry {
    groups: DashMap<UserId, DeliveryGroup>,
}

impl MembershipRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to its user's group, creating the group if needed.
    ///
    /// Returns `false` if the connection was already a member.
    pub fn subscribe(&self, handle: Arc<ConnectionHandle>) -> bool {
        let user_id = handle.user_id;
        let conn_id = handle.id;
        let added = self
            .groups
            .entry(user_id)
            .or_default()
            .insert(conn_id, handle)
            .is_none();
        debug!(conn_id = %conn_id, user_id = %user_id, added, "Subscribed connection");
        added
    }

    /// Remove a connection from `user_id`'s group, dropping the group once
    /// empty. Unknown connections are a no-op returning `false`.
    pub fn unsubscribe(&self, user_id: UserId, conn_id: ConnectionId) -> bool {
        let mut removed = false;
        self.groups.remove_if_mut(&user_id, |_, group| {
            removed = group.remove(&conn_id).is_some();
            group.is_empty()
        });
        if removed {
            debug!(conn_id = %conn_id, user_id = %user_id, "Unsubscribed connection");
        }
        removed
    }

    /// Queue `event` on every live connection of `user_id`.
    ///
    /// Returns the number of connections the event was queued on. A user
    /// with no group, and connections that closed concurrently, are
    /// skipped silently.
    pub fn publish(&self, user_id: UserId, event: &Arc<ServerEvent>) -> usize {
        let Some(group) = self.groups.get(&user_id) else {
            return 0;
        };
        group
            .values()
            .filter(|handle| handle.send(Arc::clone(event)))
            .count()
    }

    /// Number of live connections of `user_id`.
    pub fn group_size(&self, user_id: UserId) -> usize {
        self.groups.get(&user_id).map(|g| g.len()).unwrap_or(0)
    }

    /// Whether `conn_id` is in `user_id`'s group.
    pub fn contains(&self, user_id: UserId, conn_id: ConnectionId) -> bool {
        self.groups
            .get(&user_id)
            .is_some_and(|g| g.contains_key(&conn_id))
    }

    /// Number of users with at least one live connection.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total live connections across all groups.
    pub fn connection_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// Mark every connection dead and drop all groups.
    pub fn close_all(&self) -> usize {
        let mut closed = 0;
        self.groups.retain(|_, group| {
            for handle in group.values() {
                handle.mark_dead();
                closed += 1;
            }
            false
        });
        closed
    }
}

#[cfg(test)]
mod tests {
    use chatline_core::types::{RoomId, UserIdentity};

    use super::*;
    use crate::message::types::NotificationEvent;

    fn event(text: &str) -> Arc<ServerEvent> {
        Arc::new(ServerEvent::Notification(NotificationEvent {
            room_id: RoomId(7),
            room_name: "room".to_string(),
            sender_username: "u1".to_string(),
            message: text.to_string(),
        }))
    }

    fn connect(
        user: i64,
    ) -> (
        Arc<ConnectionHandle>,
        tokio::sync::mpsc::Receiver<Arc<ServerEvent>>,
    ) {
        let user = UserIdentity::new(UserId(user), format!("u{user}"));
        let (handle, rx) = ConnectionHandle::new(&user, 16);
        (Arc::new(handle), rx)
    }

    #[test]
    fn test_subscribe_then_publish_delivers_once() {
        let registry = MembershipRegistry::new();
        let (conn, mut rx) = connect(1);
        assert!(registry.subscribe(conn.clone()));
        assert!(!registry.subscribe(conn));

        assert_eq!(registry.publish(UserId(1), &event("hi")), 1);
        assert_eq!(rx.try_recv().unwrap().as_ref(), event("hi").as_ref());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_then_publish_delivers_nothing() {
        let registry = MembershipRegistry::new();
        let (conn, mut rx) = connect(1);
        registry.subscribe(conn.clone());

        assert!(registry.unsubscribe(UserId(1), conn.id));
        assert!(!registry.unsubscribe(UserId(1), conn.id));
        assert_eq!(registry.publish(UserId(1), &event("hi")), 0);
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.group_count(), 0);
    }

    #[test]
    fn test_group_spans_all_connections_of_a_user() {
        let registry = MembershipRegistry::new();
        let (a, mut rx_a) = connect(1);
        let (b, mut rx_b) = connect(1);
        let (other, mut rx_other) = connect(2);
        registry.subscribe(a.clone());
        registry.subscribe(b);
        registry.subscribe(other);

        assert_eq!(registry.group_size(UserId(1)), 2);
        assert_eq!(registry.publish(UserId(1), &event("hi")), 2);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_other.try_recv().is_err());

        registry.unsubscribe(UserId(1), a.id);
        assert_eq!(registry.group_size(UserId(1)), 1);
        assert_eq!(registry.group_count(), 2);
    }

    #[test]
    fn test_publish_to_absent_group_is_noop() {
        let registry = MembershipRegistry::new();
        assert_eq!(registry.publish(UserId(9), &event("hi")), 0);
        assert!(!registry.unsubscribe(UserId(9), ConnectionId::new_v4()));
    }

    #[test]
    fn test_closed_connection_is_skipped() {
        let registry = MembershipRegistry::new();
        let (conn, rx) = connect(1);
        registry.subscribe(conn.clone());
        drop(rx);

        assert_eq!(registry.publish(UserId(1), &event("hi")), 0);
        assert!(!conn.is_alive());
    }

    #[test]
    fn test_close_all_empties_registry() {
        let registry = MembershipRegistry::new();
        let (a, _rx_a) = connect(1);
        let (b, _rx_b) = connect(2);
        registry.subscribe(a.clone());
        registry.subscribe(b);

        assert_eq!(registry.close_all(), 2);
        assert_eq!(registry.connection_count(), 0);
        assert!(!a.is_alive());
    }
}
