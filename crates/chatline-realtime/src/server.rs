//! Top-level real-time engine that wires the fan-out core together.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use chatline_core::config::RealtimeConfig;
use chatline_core::traits::{ChatStore, TokenVerifier, UserStore};

use crate::connection::authenticator::ConnectionAuthenticator;
use crate::metrics::RealtimeMetrics;
use crate::registry::MembershipRegistry;
use crate::router::FanoutRouter;
use crate::session::ConnectionSession;

/// Owns the single membership registry and hands every session a share
/// of it.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Delivery groups.
    pub registry: Arc<MembershipRegistry>,
    /// Fan-out router.
    pub router: Arc<FanoutRouter>,
    /// Handshake authenticator.
    pub authenticator: Arc<ConnectionAuthenticator>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("groups", &self.registry.group_count())
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine over its collaborators.
    pub fn new(
        config: RealtimeConfig,
        store: Arc<dyn ChatStore>,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenVerifier>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(MembershipRegistry::new());
        let router = Arc::new(FanoutRouter::new(store, registry.clone(), metrics.clone()));
        let authenticator = Arc::new(ConnectionAuthenticator::new(tokens, users));

        info!(
            connection_buffer_size = config.connection_buffer_size,
            max_frame_bytes = config.max_frame_bytes,
            "Real-time engine initialized"
        );

        Self {
            registry,
            router,
            authenticator,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Start a session for a new connection.
    pub fn open_session(&self) -> ConnectionSession {
        ConnectionSession::new(
            self.registry.clone(),
            self.router.clone(),
            self.authenticator.clone(),
            self.metrics.clone(),
            self.config.clone(),
        )
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every connection task to stop and drop all delivery groups.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        let closed = self.registry.close_all();
        info!(closed, "Real-time engine shut down");
    }
}
