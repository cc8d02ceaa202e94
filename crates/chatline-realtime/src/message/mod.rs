//! Wire frames exchanged with clients.

pub mod types;
