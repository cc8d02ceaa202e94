//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound event queue. Events published
    /// to a connection whose queue is full are dropped for that connection.
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer_size: usize,
    /// Inbound text frames larger than this are dropped unparsed.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            connection_buffer_size: default_connection_buffer(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_connection_buffer() -> usize {
    256
}

fn default_max_frame_bytes() -> usize {
    65_536
}
