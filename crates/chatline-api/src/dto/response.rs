//! Response DTOs.

use serde::{Deserialize, Serialize};

use chatline_realtime::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Liveness summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Liveness plus dependency and engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// `"connected"`, `"unavailable"`, or `"memory"`.
    pub database: String,
    /// Live WebSocket connections.
    pub ws_connections: usize,
    /// Users with at least one live connection.
    pub online_users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
