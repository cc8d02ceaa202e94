//! Collaborator traits defined in `chatline-core` and implemented by other
//! crates.
//!
//! The real-time core only reads through these seams; it never creates or
//! deletes rooms, memberships, or messages.

pub mod store;
pub mod token;

pub use store::{ChatStore, UserStore};
pub use token::TokenVerifier;
