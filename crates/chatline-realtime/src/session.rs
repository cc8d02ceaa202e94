//! Per-connection session state machine.
//!
//! ```text
//! Connecting ──authenticate──▶ Authenticated ──subscribe──▶ Subscribed ──▶ Active
//!     │  (anonymous)                                             │            │
//!     └──────────────────────────────▶ Closed ◀───────close──────┴────────────┘
//! ```
//!
//! One session is driven by exactly one task, so inbound frames are handled
//! strictly in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use chatline_core::config::RealtimeConfig;
use chatline_core::error::AppError;
use chatline_core::types::Identity;

use crate::connection::authenticator::ConnectionAuthenticator;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::{ClientFrame, ServerEvent};
use crate::metrics::RealtimeMetrics;
use crate::registry::MembershipRegistry;
use crate::router::{FanoutRouter, RouteOutcome};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Handshake received, identity not yet resolved.
    Connecting,
    /// Identity resolved to a user.
    Authenticated,
    /// Registered in the user's delivery group.
    Subscribed,
    /// Handshake accepted; frames are being processed.
    Active,
    /// Terminal.
    Closed,
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame referenced a message and was routed.
    Routed(RouteOutcome),
    /// The frame was malformed or oversized and was discarded.
    Dropped,
    /// The session is not accepting frames.
    Ignored,
}

/// State machine for one WebSocket connection.
///
/// Dropping a session closes it, so a connection leaves its delivery group
/// even when the driving task is cancelled.
#[derive(Debug)]
pub struct ConnectionSession {
    state: SessionState,
    identity: Identity,
    handle: Option<Arc<ConnectionHandle>>,
    registry: Arc<MembershipRegistry>,
    router: Arc<FanoutRouter>,
    authenticator: Arc<ConnectionAuthenticator>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl ConnectionSession {
    /// Creates a session in the `Connecting` state.
    pub fn new(
        registry: Arc<MembershipRegistry>,
        router: Arc<FanoutRouter>,
        authenticator: Arc<ConnectionAuthenticator>,
        metrics: Arc<RealtimeMetrics>,
        config: RealtimeConfig,
    ) -> Self {
        Self {
            state: SessionState::Connecting,
            identity: Identity::Anonymous,
            handle: None,
            registry,
            router,
            authenticator,
            metrics,
            config,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Resolved identity; anonymous until authenticated.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Registered connection id, once subscribed.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.handle.as_ref().map(|h| h.id)
    }

    /// Resolve the handshake token.
    ///
    /// An anonymous result closes the session immediately; the caller must
    /// refuse the handshake. Returns whether the connection may proceed.
    pub async fn authenticate(&mut self, token: Option<&str>) -> bool {
        if self.state != SessionState::Connecting {
            return false;
        }

        self.identity = self.authenticator.authenticate(token).await;
        match self.identity.user() {
            Some(user) => {
                debug!(user_id = %user.id, username = %user.username, "Connection authenticated");
                self.state = SessionState::Authenticated;
                true
            }
            None => {
                self.metrics.connection_rejected();
                info!("Rejected unauthenticated connection");
                self.state = SessionState::Closed;
                false
            }
        }
    }

    /// Register the connection in its user's delivery group.
    ///
    /// Must happen before the handshake is accepted. Returns the receiving
    /// end of the connection's outbound queue.
    pub fn subscribe(&mut self) -> Result<mpsc::Receiver<Arc<ServerEvent>>, AppError> {
        let user = match (self.state, self.identity.user()) {
            (SessionState::Authenticated, Some(user)) => user,
            _ => {
                return Err(AppError::authentication(format!(
                    "Cannot subscribe a connection in state {:?}",
                    self.state
                )));
            }
        };

        let (handle, receiver) = ConnectionHandle::new(user, self.config.connection_buffer_size);
        let handle = Arc::new(handle);
        self.registry.subscribe(handle.clone());
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            "WebSocket connection registered"
        );

        self.handle = Some(handle);
        self.state = SessionState::Subscribed;
        Ok(receiver)
    }

    /// The handshake was accepted; start processing frames.
    pub fn activate(&mut self) {
        if self.state == SessionState::Subscribed {
            self.state = SessionState::Active;
        }
    }

    /// Process one inbound text frame.
    ///
    /// Frames missing either reference are dropped without changing state.
    /// A well-formed frame is routed before this returns, which is what
    /// keeps a connection's frames in order.
    pub async fn handle_frame(&mut self, raw: &str) -> FrameOutcome {
        match self.state {
            SessionState::Subscribed => self.state = SessionState::Active,
            SessionState::Active => {}
            _ => return FrameOutcome::Ignored,
        }
        if self.handle.as_ref().is_some_and(|h| !h.is_alive()) {
            // Shut down by the engine or the forwarder went away.
            self.close();
            return FrameOutcome::Ignored;
        }
        self.metrics.frame_received();

        if raw.len() > self.config.max_frame_bytes {
            self.metrics.frame_dropped();
            debug!(
                conn_id = ?self.connection_id(),
                bytes = raw.len(),
                limit = self.config.max_frame_bytes,
                "Dropping oversized frame"
            );
            return FrameOutcome::Dropped;
        }

        let Some(frame) = ClientFrame::parse(raw) else {
            self.metrics.frame_dropped();
            debug!(conn_id = ?self.connection_id(), "Dropping malformed frame");
            return FrameOutcome::Dropped;
        };

        FrameOutcome::Routed(self.router.route(frame.room_id, frame.message_id).await)
    }

    /// Leave the delivery group and enter `Closed`.
    ///
    /// Safe to call any number of times. Returns `true` only on the call
    /// that removed the connection from its group.
    pub fn close(&mut self) -> bool {
        self.state = SessionState::Closed;
        let Some(handle) = self.handle.take() else {
            return false;
        };

        handle.mark_dead();
        let removed = self.registry.unsubscribe(handle.user_id, handle.id);
        self.metrics.connection_closed();
        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            "WebSocket connection unregistered"
        );
        removed
    }
}

impl Drop for ConnectionSession {
    fn drop(&mut self) {
        self.close();
    }
}
