//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use chatline_core::types::{UserId, UserIdentity};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique display handle.
    pub username: String,
    /// Unique login email.
    pub email: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity the real-time core works with.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.id, self.username.clone())
    }
}
