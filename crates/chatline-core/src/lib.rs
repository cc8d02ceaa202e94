//! # chatline-core
//!
//! Core crate for Chatline. Contains configuration schemas, typed
//! identifiers, the records exchanged with the persistent-store
//! collaborators, the collaborator traits themselves, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Chatline crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
