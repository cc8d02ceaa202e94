//! # chatline-auth
//!
//! HS256 access tokens: issuance for the account side of the product and
//! verification for WebSocket handshakes.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
