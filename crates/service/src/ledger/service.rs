use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use models::same_email;
use models::session::Session;
use models::user_credentials::{validate_pair, validate_password, Credential, CredentialInput, Role};

use crate::auth::password::{hash_password, HashCost};
use crate::auth::token::SessionIssuer;
use crate::clock::Clock;
use crate::directory::AccessDirectory;
use crate::errors::ServiceError;
use crate::storage::Collection;

pub const CREDENTIALS_KEY: &str = "credentials";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CredentialRecords {
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

pub struct CredentialLedger {
    records: Collection<CredentialRecords>,
    directory: Arc<AccessDirectory>,
    sessions: Arc<SessionIssuer>,
    clock: Arc<dyn Clock>,
    hash_cost: HashCost,
}

impl CredentialLedger {
    pub fn new(
        records: Collection<CredentialRecords>,
        directory: Arc<AccessDirectory>,
        sessions: Arc<SessionIssuer>,
        clock: Arc<dyn Clock>,
        hash_cost: HashCost,
    ) -> Self {
        Self { records, directory, sessions, clock, hash_cost }
    }

    /// Create the admin/operator pair for an authorized email that still
    /// needs setup, and log the identity in as administrator. A pair left
    /// over from an earlier approval cycle is replaced wholesale.
    ///
    /// Validation failures, unknown emails and identities that already
    /// completed setup leave every record untouched. If the directory cannot
    /// be updated after the pair was written, the previous pair is restored.
    #[instrument(skip(self, admin, operator), fields(email = %email))]
    pub async fn setup_dual_credentials(
        &self,
        email: &str,
        admin: CredentialInput,
        operator: CredentialInput,
    ) -> Result<Session, ServiceError> {
        validate_pair(&admin, &operator)?;
        let user = self
            .directory
            .find_authorized(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("authorized user"))?;
        if user.has_setup_password {
            return Err(ServiceError::Validation("credentials are already set up for this email".into()));
        }

        let now = self.clock.now();
        let admin_cred = Credential {
            email: user.email.clone(),
            username: admin.username.trim().to_string(),
            password_hash: hash_password(&admin.password, self.hash_cost)?,
            role: Role::Admin,
            setup_date: now,
            last_password_change: None,
        };
        let operator_cred = Credential {
            email: user.email.clone(),
            username: operator.username.trim().to_string(),
            password_hash: hash_password(&operator.password, self.hash_cost)?,
            role: Role::Operator,
            setup_date: now,
            last_password_change: None,
        };

        let pair = vec![admin_cred.clone(), operator_cred];
        let written = pair.clone();
        let previous = self
            .records
            .update(|doc| {
                let (prev, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut doc.credentials)
                    .into_iter()
                    .partition(|c| same_email(&c.email, &user.email));
                doc.credentials = rest;
                doc.credentials.extend(pair);
                Ok(prev)
            })
            .await?;

        let user = match self.directory.mark_password_setup(&user.email).await {
            Ok(user) => user,
            Err(e) => {
                self.restore_pair(&user.email, &written, previous).await;
                return Err(e);
            }
        };

        info!(user_id = %user.id, "credentials_setup");
        self.sessions.issue(&user, &admin_cred).await
    }

    /// Put `previous` back, unless another setup already replaced `written`.
    async fn restore_pair(&self, email: &str, written: &[Credential], previous: Vec<Credential>) {
        let res = self
            .records
            .update(|doc| {
                let current: Vec<&Credential> = doc.credentials.iter().filter(|c| same_email(&c.email, email)).collect();
                if current.len() != written.len() || current.iter().zip(written).any(|(c, w)| *c != w) {
                    return Ok(());
                }
                doc.credentials.retain(|c| !same_email(&c.email, email));
                doc.credentials.extend(previous);
                Ok(())
            })
            .await;
        if let Err(e) = res {
            error!(%email, error = %e, "failed to restore previous credentials after setup failure");
        }
    }

    /// The credential with this email and exact username, if any.
    pub async fn find_by_login(&self, email: &str, username: &str) -> Result<Option<Credential>, ServiceError> {
        Ok(self
            .records
            .load()
            .await?
            .credentials
            .into_iter()
            .find(|c| same_email(&c.email, email) && c.username == username))
    }

    pub async fn credentials_for(&self, email: &str) -> Result<Vec<Credential>, ServiceError> {
        Ok(self
            .records
            .load()
            .await?
            .credentials
            .into_iter()
            .filter(|c| same_email(&c.email, email))
            .collect())
    }

    /// Rotate the password of one role's credential.
    #[instrument(skip(self, new_password))]
    pub async fn set_password(&self, email: &str, role: Role, new_password: &str) -> Result<(), ServiceError> {
        validate_password(role, new_password)?;
        let hash = hash_password(new_password, self.hash_cost)?;
        let now = self.clock.now();
        self.records
            .update(|doc| {
                let cred = doc
                    .credentials
                    .iter_mut()
                    .find(|c| same_email(&c.email, email) && c.role == role)
                    .ok_or_else(|| ServiceError::not_found("credential"))?;
                cred.password_hash = hash;
                cred.last_password_change = Some(now);
                Ok(())
            })
            .await?;
        info!(%role, "password_changed");
        Ok(())
    }

    /// Remove every credential for an email; returns how many were removed.
    #[instrument(skip(self))]
    pub async fn purge(&self, email: &str) -> Result<usize, ServiceError> {
        let removed = self
            .records
            .update(|doc| {
                let before = doc.credentials.len();
                doc.credentials.retain(|c| !same_email(&c.email, email));
                Ok(before - doc.credentials.len())
            })
            .await?;
        info!(removed, "credentials_purged");
        Ok(removed)
    }
}
