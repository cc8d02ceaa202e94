//! Bearer-token collaborator trait.

use crate::result::AppResult;
use crate::types::UserId;

/// Verifies a bearer token and extracts the user it was issued to.
pub trait TokenVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Check signature, expiry, and token type. Returns an
    /// authentication error for any token that does not verify.
    fn verify_and_decode(&self, token: &str) -> AppResult<UserId>;
}
