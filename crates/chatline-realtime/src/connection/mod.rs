//! Connection-level building blocks.

pub mod authenticator;
pub mod handle;
