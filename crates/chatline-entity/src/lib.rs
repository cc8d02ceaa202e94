//! # chatline-entity
//!
//! Domain entity models for Chatline. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod member;
pub mod message;
pub mod room;
pub mod user;

pub use member::RoomMember;
pub use message::{Message, ReadReceipts};
pub use room::{Room, RoomKind};
pub use user::User;
