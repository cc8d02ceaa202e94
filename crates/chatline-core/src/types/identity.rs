//! The identity a connection presents after authentication.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A resolved, registered user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User primary key.
    pub id: UserId,
    /// Unique username.
    pub username: String,
}

impl UserIdentity {
    /// Create a new identity.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

/// Outcome of connection authentication.
///
/// Authentication never fails outright: every failure collapses into
/// [`Identity::Anonymous`], and the session layer refuses anonymous
/// connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No valid credential was presented.
    Anonymous,
    /// A verified, existing user.
    User(UserIdentity),
}

impl Identity {
    /// The user, if authenticated.
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::User(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}
