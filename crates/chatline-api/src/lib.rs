//! # chatline-api
//!
//! HTTP layer for Chatline built on Axum.
//!
//! Provides the WebSocket upgrade endpoint, health endpoints, CORS and
//! tracing middleware, error mapping, and the server bootstrap.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
