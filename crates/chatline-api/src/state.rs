//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chatline_core::config::AppConfig;
use chatline_database::DatabasePool;
use chatline_realtime::RealtimeEngine;

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Real-time fan-out engine.
    pub realtime: Arc<RealtimeEngine>,
    /// PostgreSQL pool; `None` when running on the in-memory store.
    pub database: Option<DatabasePool>,
}
