//! # chatline-database
//!
//! PostgreSQL connection management, repositories for the chat tables, and
//! the two store backends (`DatabaseChatStore`, `MemoryStore`) that serve
//! the real-time core's collaborator traits.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::DatabaseChatStore;
