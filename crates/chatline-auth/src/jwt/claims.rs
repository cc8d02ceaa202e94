//! JWT claims structure used in access tokens.

use serde::{Deserialize, Serialize};

use chatline_core::types::UserId;

/// Claims payload embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user the token was issued to.
    pub user_id: UserId,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Token accepted by the real-time endpoint.
    Access,
    /// Only exchangeable for a new access token; never admitted here.
    Refresh,
}
