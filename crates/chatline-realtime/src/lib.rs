//! # chatline-realtime
//!
//! Real-time fan-out core for Chatline. Provides:
//!
//! - Connection authentication from a query-string token
//! - A membership registry mapping each user to their live connections
//! - A fan-out router that delivers a persisted message to every room member
//! - The per-connection session state machine

pub mod connection;
pub mod directory;
pub mod message;
pub mod metrics;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;

pub use connection::authenticator::ConnectionAuthenticator;
pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use directory::RoomDirectory;
pub use message::types::{ClientFrame, DeliveryEvent, NotificationEvent, ServerEvent};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use registry::MembershipRegistry;
pub use router::{AbortReason, FanoutRouter, RouteOutcome};
pub use server::RealtimeEngine;
pub use session::{ConnectionSession, FrameOutcome, SessionState};
