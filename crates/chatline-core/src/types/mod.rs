//! Core type definitions used across the Chatline workspace.

pub mod id;
pub mod identity;
pub mod record;

pub use id::*;
pub use identity::{Identity, UserIdentity};
pub use record::{MessageRecord, RoomRoster};
