//! Session Authenticator plus the password hashing and session token
//! helpers it shares with the Credential Ledger.

pub mod password;
pub mod service;
pub mod token;

use chrono::Duration;

pub use password::HashCost;
pub use service::SessionAuthenticator;
pub use token::{SessionClaims, SessionIssuer, TokenSigner};

/// Auth configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Out-of-band secret guarding the super-admin console.
    pub super_admin_secret: String,
    /// Enables signed session tokens when present.
    pub jwt_secret: Option<String>,
    pub session_ttl: Duration,
    pub hash_cost: HashCost,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("super_admin_secret", &"<redacted>")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("session_ttl", &self.session_ttl)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            super_admin_secret: String::new(),
            jwt_secret: None,
            session_ttl: Duration::hours(12),
            hash_cost: HashCost::default(),
        }
    }
}
