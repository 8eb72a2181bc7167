//! Credentials: signed session tokens and password hashes.

pub mod password;
pub mod token;

pub use password::CredentialHasher;
pub use token::{AuthError, TokenIssuer, TOKEN_COOKIE};
