//! Real-time engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    connections_rejected: AtomicU64,
    frames_received: AtomicU64,
    frames_dropped: AtomicU64,
    routes_completed: AtomicU64,
    routes_aborted: AtomicU64,
    events_published: AtomicU64,
    events_delivered: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection was admitted.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// An admitted connection closed.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    /// A handshake was refused.
    pub fn connection_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A text frame arrived.
    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A frame was malformed or oversized.
    pub fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A route call finished its fan-out.
    pub fn route_completed(&self) {
        self.routes_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// A route call aborted before publishing.
    pub fn route_aborted(&self) {
        self.routes_aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// One publish call reached `delivered` connections.
    pub fn event_published(&self, delivered: usize) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        self.events_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            routes_completed: self.routes_completed.load(Ordering::Relaxed),
            routes_aborted: self.routes_aborted.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever admitted.
    pub connections_total: u64,
    /// Currently admitted connections.
    pub connections_active: u64,
    /// Handshakes refused for lack of a valid identity.
    pub connections_rejected: u64,
    /// Text frames received.
    pub frames_received: u64,
    /// Frames dropped as malformed.
    pub frames_dropped: u64,
    /// Route calls that fanned out.
    pub routes_completed: u64,
    /// Route calls aborted on a stale reference.
    pub routes_aborted: u64,
    /// Registry publish calls.
    pub events_published: u64,
    /// Events queued on connections.
    pub events_delivered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_connections_never_underflow() {
        let metrics = RealtimeMetrics::new();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.connection_closed();

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_total, 1);
        assert_eq!(snap.connections_active, 0);
    }
}
