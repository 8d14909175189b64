//! Session construction and signed session tokens.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::session::Session;
use models::user::AuthorizedUser;
use models::user_credentials::{Credential, Role};

use crate::business_registry::BusinessRegistry;
use crate::errors::ServiceError;

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authorized user id.
    pub sub: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signer for session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self { secret: secret.into(), ttl }
    }

    pub fn sign(&self, session: &Session) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: session.id.to_string(),
            email: session.email.clone(),
            username: session.username.clone(),
            role: session.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| ServiceError::Token(e.to_string()))
    }

    /// Any failure (bad signature, expiry, garbage) is an authentication error.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ServiceError> {
        decode::<SessionClaims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Authentication)
    }
}

/// Builds sessions for authenticated credentials: resolves the business the
/// identity owns and attaches a signed token when signing is configured.
pub struct SessionIssuer {
    businesses: Arc<BusinessRegistry>,
    signer: Option<TokenSigner>,
}

impl SessionIssuer {
    pub fn new(businesses: Arc<BusinessRegistry>, signer: Option<TokenSigner>) -> Self {
        Self { businesses, signer }
    }

    pub async fn issue(&self, user: &AuthorizedUser, credential: &Credential) -> Result<Session, ServiceError> {
        let mut session = self.describe(user, credential).await?;
        if let Some(signer) = &self.signer {
            session.token = Some(signer.sign(&session)?);
        }
        Ok(session)
    }

    /// Session view without a token.
    pub async fn describe(&self, user: &AuthorizedUser, credential: &Credential) -> Result<Session, ServiceError> {
        let business_id = self.businesses.find_by_owner(user.id).await?.map(|b| b.id);
        Ok(Session::new(user, credential, business_id))
    }

    pub fn claims(&self, token: &str) -> Result<(Uuid, SessionClaims), ServiceError> {
        let signer = self.signer.as_ref().ok_or(ServiceError::Authentication)?;
        let claims = signer.verify(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ServiceError::Authentication)?;
        Ok((user_id, claims))
    }
}
