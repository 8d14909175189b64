use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument, warn};

use models::session::Session;

use super::password::verify_password;
use super::token::SessionIssuer;
use crate::directory::AccessDirectory;
use crate::errors::ServiceError;
use crate::ledger::CredentialLedger;

/// Login for onboarded identities plus the super-admin gate.
///
/// Every rejected login surfaces the same [`ServiceError::Authentication`];
/// the log line carries the actual cause.
pub struct SessionAuthenticator {
    directory: Arc<AccessDirectory>,
    ledger: Arc<CredentialLedger>,
    sessions: Arc<SessionIssuer>,
    super_admin_secret: String,
}

impl SessionAuthenticator {
    pub fn new(
        directory: Arc<AccessDirectory>,
        ledger: Arc<CredentialLedger>,
        sessions: Arc<SessionIssuer>,
        super_admin_secret: impl Into<String>,
    ) -> Self {
        Self { directory, ledger, sessions, super_admin_secret: super_admin_secret.into() }
    }

    /// Authenticate `(email, username, password)` against the ledger.
    ///
    /// Succeeds only while the email is still an authorized identity that has
    /// completed credential setup, so restricted identities keep their stored
    /// pair but cannot use it.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, username: &str, password: &str) -> Result<Session, ServiceError> {
        let Some(credential) = self.ledger.find_by_login(email, username).await? else {
            debug!("no credential for login pair");
            return Err(ServiceError::Authentication);
        };
        if !verify_password(password, &credential.password_hash)? {
            debug!("password mismatch");
            return Err(ServiceError::Authentication);
        }
        let user = match self.directory.find_authorized(email).await? {
            Some(user) if user.has_setup_password => user,
            Some(_) => {
                warn!("credential present for an identity awaiting setup");
                return Err(ServiceError::Authentication);
            }
            None => {
                debug!("identity is not authorized");
                return Err(ServiceError::Authentication);
            }
        };

        let session = self.sessions.issue(&user, &credential).await?;
        info!(user_id = %user.id, role = %credential.role, "login_succeeded");
        Ok(session)
    }

    /// Constant-time comparison against the configured secret. An empty
    /// secret disables the console.
    pub fn super_admin_login(&self, password: &str) -> bool {
        if self.super_admin_secret.is_empty() {
            return false;
        }
        let ok: bool = self.super_admin_secret.as_bytes().ct_eq(password.as_bytes()).into();
        if ok {
            info!("super_admin_login");
        } else {
            warn!("super_admin_login_rejected");
        }
        ok
    }

    /// Resolve a signed token back into a live session.
    ///
    /// The identity must still be authorized and set up, and the credential
    /// named in the token must still exist with the same role.
    pub async fn verify_token(&self, token: &str) -> Result<Session, ServiceError> {
        let (user_id, claims) = self.sessions.claims(token)?;
        let user = self
            .directory
            .find_authorized_by_id(user_id)
            .await?
            .filter(|u| u.has_setup_password)
            .ok_or(ServiceError::Authentication)?;
        let credential = self
            .ledger
            .find_by_login(&user.email, &claims.username)
            .await?
            .filter(|c| c.role == claims.role)
            .ok_or(ServiceError::Authentication)?;

        let mut session = self.sessions.describe(&user, &credential).await?;
        session.token = Some(token.to_string());
        Ok(session)
    }

    /// Sessions are stateless; logging out is the caller discarding its token.
    pub fn logout(&self, session: Session) {
        info!(user_id = %session.id, role = %session.role, "logout");
    }
}
