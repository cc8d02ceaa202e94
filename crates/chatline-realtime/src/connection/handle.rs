//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use chatline_core::types::{UserId, UserIdentity};

use crate::message::types::ServerEvent;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// The registry-facing side of one live connection.
///
/// Holds the sender half of the connection's outbound queue. The receiver
/// half is drained by the connection's forwarder task.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Owning user.
    pub user_id: UserId,
    /// Username, cached for logging.
    pub username: String,
    /// Outbound event queue.
    sender: mpsc::Sender<Arc<ServerEvent>>,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle for `user` and the receiver its forwarder drains.
    pub fn new(user: &UserIdentity, buffer: usize) -> (Self, mpsc::Receiver<Arc<ServerEvent>>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id: Uuid::new_v4(),
            user_id: user.id,
            username: user.username.clone(),
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        };
        (handle, receiver)
    }

    /// Queue an event without waiting. Returns whether it was queued.
    ///
    /// A full queue drops the event for this connection only. A closed
    /// queue marks the connection dead.
    pub fn send(&self, event: Arc<ServerEvent>) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, user_id = %self.user_id, "Send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Whether the connection still accepts events.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Stop accepting events.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use chatline_core::types::RoomId;

    use super::*;
    use crate::message::types::NotificationEvent;

    fn event() -> Arc<ServerEvent> {
        Arc::new(ServerEvent::Notification(NotificationEvent {
            room_id: RoomId(1),
            room_name: "r".to_string(),
            sender_username: "a".to_string(),
            message: "m".to_string(),
        }))
    }

    #[test]
    fn test_full_buffer_drops_event() {
        let (handle, mut rx) = ConnectionHandle::new(&UserIdentity::new(UserId(1), "a"), 1);
        assert!(handle.send(event()));
        assert!(!handle.send(event()));
        assert!(handle.is_alive());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_marks_dead() {
        let (handle, rx) = ConnectionHandle::new(&UserIdentity::new(UserId(1), "a"), 4);
        drop(rx);
        assert!(!handle.send(event()));
        assert!(!handle.is_alive());
    }
}
