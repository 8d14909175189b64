use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, error, info, instrument};

use models::reset_request::{normalize_code, ResetRequest, RESET_CODE_LEN};
use models::same_email;
use models::user_credentials::{validate_password, Role};

use super::notifier::Notifier;
use super::RecoveryConfig;
use crate::clock::Clock;
use crate::directory::AccessDirectory;
use crate::errors::ServiceError;
use crate::ledger::CredentialLedger;
use crate::storage::Collection;

pub const RESET_REQUESTS_KEY: &str = "reset_requests";

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResetRecords {
    #[serde(default)]
    pub requests: Vec<ResetRequest>,
}

/// Six uppercase alphanumeric characters.
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..RESET_CODE_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

fn codes_match(stored: &str, supplied: &str) -> bool {
    let supplied = normalize_code(supplied);
    stored.as_bytes().ct_eq(supplied.as_bytes()).into()
}

pub struct RecoveryService {
    records: Collection<ResetRecords>,
    directory: Arc<AccessDirectory>,
    ledger: Arc<CredentialLedger>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: RecoveryConfig,
}

impl RecoveryService {
    pub fn new(
        records: Collection<ResetRecords>,
        directory: Arc<AccessDirectory>,
        ledger: Arc<CredentialLedger>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: RecoveryConfig,
    ) -> Self {
        Self { records, directory, ledger, notifier, clock, config }
    }

    /// Issue a fresh code for an onboarded identity, superseding any earlier
    /// one. Returns `false` (and does nothing) for unknown identities or ones
    /// that have not set up credentials yet.
    ///
    /// The code is stored only after the notifier accepted it.
    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> Result<bool, ServiceError> {
        let user = match self.directory.find_authorized(email).await? {
            Some(user) if user.has_setup_password => user,
            _ => {
                debug!("reset requested for an identity without credentials");
                return Ok(false);
            }
        };

        let code = generate_code();
        tokio::time::timeout(self.config.delivery_timeout, self.notifier.send(&user.email, &code))
            .await
            .map_err(|_| ServiceError::Delivery("notifier timed out".into()))??;

        let now = self.clock.now();
        let request = ResetRequest {
            email: user.email.clone(),
            reset_code: code,
            expires_at: now + self.config.code_ttl,
            requested_at: now,
        };
        self.records
            .update(|doc| {
                doc.requests.retain(|r| !same_email(&r.email, &user.email) && r.is_live(now));
                doc.requests.push(request);
                Ok(())
            })
            .await?;
        info!(user_id = %user.id, "reset_code_issued");
        Ok(true)
    }

    /// Read-only check of a code; may be called any number of times.
    pub async fn validate_code(&self, email: &str, code: &str) -> Result<bool, ServiceError> {
        let now = self.clock.now();
        Ok(self
            .live_request(email)
            .await?
            .map_or(false, |r| r.is_live(now) && codes_match(&r.reset_code, code)))
    }

    /// The stored request for an email, expired or not.
    pub async fn live_request(&self, email: &str) -> Result<Option<ResetRequest>, ServiceError> {
        Ok(self
            .records
            .load()
            .await?
            .requests
            .into_iter()
            .find(|r| same_email(&r.email, email)))
    }

    /// Consume a valid code and rotate the password of `role`'s credential.
    /// Returns `false` when the code is wrong, expired or already used.
    ///
    /// The code is removed in a single write before the password changes, so
    /// concurrent resets with one code rotate at most once. If the rotation
    /// fails the code is put back.
    #[instrument(skip(self, code, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        role: Role,
        code: &str,
        new_password: &str,
    ) -> Result<bool, ServiceError> {
        if !self.validate_code(email, code).await? {
            debug!("reset attempted with an invalid or expired code");
            return Ok(false);
        }
        validate_password(role, new_password)?;

        let now = self.clock.now();
        let consumed = self
            .records
            .update(|doc| {
                let idx = doc
                    .requests
                    .iter()
                    .position(|r| same_email(&r.email, email) && r.is_live(now) && codes_match(&r.reset_code, code));
                Ok(idx.map(|i| doc.requests.remove(i)))
            })
            .await?;
        let Some(request) = consumed else {
            debug!("reset code was consumed concurrently");
            return Ok(false);
        };

        if let Err(err) = self.ledger.set_password(email, role, new_password).await {
            self.restore_request(request).await;
            return Err(err);
        }
        info!(%role, "password_reset");
        Ok(true)
    }

    /// Put a consumed code back unless a newer request replaced it meanwhile.
    async fn restore_request(&self, request: ResetRequest) {
        let res = self
            .records
            .update(|doc| {
                if !doc.requests.iter().any(|r| same_email(&r.email, &request.email)) {
                    doc.requests.push(request);
                }
                Ok(())
            })
            .await;
        if let Err(err) = res {
            error!(error = %err, "failed to restore reset code after an aborted reset");
        }
    }
}
