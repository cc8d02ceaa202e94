//! WebSocket authentication from the `token` query parameter.

use std::sync::Arc;

use tracing::{debug, warn};

use chatline_core::traits::{TokenVerifier, UserStore};
use chatline_core::types::Identity;

/// Resolves a handshake token to an [`Identity`].
///
/// Never fails: a missing, malformed, expired, or foreign token, or one
/// naming a user that no longer exists, yields [`Identity::Anonymous`].
#[derive(Debug, Clone)]
pub struct ConnectionAuthenticator {
    tokens: Arc<dyn TokenVerifier>,
    users: Arc<dyn UserStore>,
}

impl ConnectionAuthenticator {
    /// Creates a new authenticator.
    pub fn new(tokens: Arc<dyn TokenVerifier>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Authenticate a connection before it is accepted.
    pub async fn authenticate(&self, token: Option<&str>) -> Identity {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            debug!("No token presented");
            return Identity::Anonymous;
        };

        let user_id = match self.tokens.verify_and_decode(token) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "Token rejected");
                return Identity::Anonymous;
            }
        };

        match self.users.resolve_user(user_id).await {
            Ok(Some(user)) => Identity::User(user),
            Ok(None) => {
                debug!(user_id = %user_id, "Token names an unknown user");
                Identity::Anonymous
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "User lookup failed during authentication");
                Identity::Anonymous
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chatline_auth::JwtEncoder;
    use chatline_auth::jwt::JwtDecoder;
    use chatline_core::config::AuthConfig;
    use chatline_core::types::UserId;
    use chatline_database::MemoryStore;

    use super::*;

    fn setup() -> (ConnectionAuthenticator, JwtEncoder) {
        let config = AuthConfig::default();
        let store = MemoryStore::default();
        store.insert_user(UserId(1), "u1");
        let auth = ConnectionAuthenticator::new(
            Arc::new(JwtDecoder::new(&config)),
            Arc::new(store),
        );
        (auth, JwtEncoder::new(&config))
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let (auth, encoder) = setup();
        let token = encoder.generate_access_token(UserId(1)).unwrap();
        let identity = auth.authenticate(Some(&token)).await;
        assert_eq!(identity.user().map(|u| u.username.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_failures_collapse_to_anonymous() {
        let (auth, encoder) = setup();
        assert_eq!(auth.authenticate(None).await, Identity::Anonymous);
        assert_eq!(auth.authenticate(Some("  ")).await, Identity::Anonymous);
        assert_eq!(auth.authenticate(Some("garbage")).await, Identity::Anonymous);

        let unknown = encoder.generate_access_token(UserId(99)).unwrap();
        assert_eq!(auth.authenticate(Some(&unknown)).await, Identity::Anonymous);
    }
}
