//! Repository implementations for the chat tables.

pub mod message;
pub mod room;
pub mod user;

pub use message::MessageRepository;
pub use room::RoomRepository;
pub use user::UserRepository;
