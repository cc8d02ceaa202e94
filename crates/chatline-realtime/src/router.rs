//! Fan-out router: delivers a persisted message to every room member.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use chatline_core::traits::ChatStore;
use chatline_core::types::{MessageId, RoomId};

use crate::directory::RoomDirectory;
use crate::message::types::{DeliveryEvent, NotificationEvent, ServerEvent};
use crate::metrics::RealtimeMetrics;
use crate::registry::MembershipRegistry;

/// Result of one [`FanoutRouter::route`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Events were published to every member.
    Delivered {
        /// Room members targeted.
        recipients: usize,
        /// Connections that received the delivery event.
        deliveries: usize,
        /// Connections that received the notification event.
        notifications: usize,
    },
    /// Nothing was published.
    Aborted(AbortReason),
}

/// Why a route call published nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The message no longer exists.
    MessageNotFound,
    /// The room no longer exists.
    RoomNotFound,
    /// The message belongs to a different room than the one referenced.
    RoomMismatch,
    /// A store lookup failed.
    StoreUnavailable,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageNotFound => write!(f, "message_not_found"),
            Self::RoomNotFound => write!(f, "room_not_found"),
            Self::RoomMismatch => write!(f, "room_mismatch"),
            Self::StoreUnavailable => write!(f, "store_unavailable"),
        }
    }
}

/// Publishes delivery and notification events for persisted messages.
///
/// Routing is at-most-once: there is no retry, and a call either aborts
/// before its first publish or publishes to every member.
#[derive(Debug, Clone)]
pub struct FanoutRouter {
    store: Arc<dyn ChatStore>,
    directory: RoomDirectory,
    registry: Arc<MembershipRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl FanoutRouter {
    /// Creates a router publishing into `registry`.
    pub fn new(
        store: Arc<dyn ChatStore>,
        registry: Arc<MembershipRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            directory: RoomDirectory::new(store.clone()),
            store,
            registry,
            metrics,
        }
    }

    /// Fan out message `message_id` posted in `room_id`.
    pub async fn route(&self, room_id: RoomId, message_id: MessageId) -> RouteOutcome {
        let message = match self.store.get_message(message_id).await {
            Ok(Some(message)) => message,
            Ok(None) => return self.abort(room_id, message_id, AbortReason::MessageNotFound),
            Err(e) => {
                warn!(room_id = %room_id, message_id = %message_id, error = %e, "Message lookup failed");
                return self.abort(room_id, message_id, AbortReason::StoreUnavailable);
            }
        };
        if message.room_id != room_id {
            return self.abort(room_id, message_id, AbortReason::RoomMismatch);
        }

        let roster = match self.directory.lookup(room_id).await {
            Ok(Some(roster)) => roster,
            Ok(None) => return self.abort(room_id, message_id, AbortReason::RoomNotFound),
            Err(e) => {
                warn!(room_id = %room_id, message_id = %message_id, error = %e, "Room lookup failed");
                return self.abort(room_id, message_id, AbortReason::StoreUnavailable);
            }
        };

        // Recomputed from the member count, not the stored flag.
        let is_group = roster.members.len() > 2;

        let delivery = Arc::new(ServerEvent::Delivery(DeliveryEvent::new(
            &message,
            room_id,
            roster.display_name.clone(),
            is_group,
        )));
        let notification = Arc::new(ServerEvent::Notification(NotificationEvent {
            room_id,
            room_name: roster.display_name,
            sender_username: message.sender_username.clone(),
            message: message.text.clone(),
        }));

        let mut deliveries = 0;
        let mut notifications = 0;
        for member in &roster.members {
            let delivered = self.registry.publish(member.id, &delivery);
            self.metrics.event_published(delivered);
            deliveries += delivered;

            if member.id != message.sender_id {
                let notified = self.registry.publish(member.id, &notification);
                self.metrics.event_published(notified);
                notifications += notified;
            }
        }

        self.metrics.route_completed();
        info!(
            room_id = %room_id,
            message_id = %message_id,
            recipients = roster.members.len(),
            deliveries,
            notifications,
            "Message routed"
        );

        RouteOutcome::Delivered {
            recipients: roster.members.len(),
            deliveries,
            notifications,
        }
    }

    fn abort(&self, room_id: RoomId, message_id: MessageId, reason: AbortReason) -> RouteOutcome {
        self.metrics.route_aborted();
        debug!(room_id = %room_id, message_id = %message_id, reason = %reason, "Routing aborted");
        RouteOutcome::Aborted(reason)
    }
}
