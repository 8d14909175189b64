//! Wiring of the four access-control components over one shared store.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthConfig, SessionAuthenticator, SessionIssuer, TokenSigner};
use crate::business_registry::{BusinessRegistry, BUSINESSES_KEY};
use crate::clock::Clock;
use crate::directory::service::DIRECTORY_KEY;
use crate::directory::AccessDirectory;
use crate::ledger::service::CREDENTIALS_KEY;
use crate::ledger::CredentialLedger;
use crate::recovery::service::RESET_REQUESTS_KEY;
use crate::recovery::{Notifier, RecoveryConfig, RecoveryService};
use crate::storage::{Collection, DurableStore};

#[derive(Debug, Clone)]
pub struct AccessConfig {
    pub auth: AuthConfig,
    pub recovery: RecoveryConfig,
    /// Upper bound on every single store call.
    pub store_timeout: Duration,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self { auth: AuthConfig::default(), recovery: RecoveryConfig::default(), store_timeout: Duration::from_secs(2) }
    }
}

/// Handles to every component, sharing one store, notifier and clock.
#[derive(Clone)]
pub struct AccessControl {
    pub directory: Arc<AccessDirectory>,
    pub ledger: Arc<CredentialLedger>,
    pub authenticator: Arc<SessionAuthenticator>,
    pub recovery: Arc<RecoveryService>,
    pub businesses: Arc<BusinessRegistry>,
}

impl AccessControl {
    pub fn new(
        store: Arc<dyn DurableStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        cfg: AccessConfig,
    ) -> Self {
        let timeout = cfg.store_timeout;
        let directory = Arc::new(AccessDirectory::new(
            Collection::new(store.clone(), DIRECTORY_KEY, timeout),
            clock.clone(),
        ));
        let businesses = Arc::new(BusinessRegistry::new(
            Collection::new(store.clone(), BUSINESSES_KEY, timeout),
            clock.clone(),
        ));
        let signer = cfg
            .auth
            .jwt_secret
            .as_deref()
            .map(|secret| TokenSigner::new(secret, cfg.auth.session_ttl));
        let sessions = Arc::new(SessionIssuer::new(businesses.clone(), signer));
        let ledger = Arc::new(CredentialLedger::new(
            Collection::new(store.clone(), CREDENTIALS_KEY, timeout),
            directory.clone(),
            sessions.clone(),
            clock.clone(),
            cfg.auth.hash_cost,
        ));
        let authenticator = Arc::new(SessionAuthenticator::new(
            directory.clone(),
            ledger.clone(),
            sessions,
            cfg.auth.super_admin_secret.clone(),
        ));
        let recovery = Arc::new(RecoveryService::new(
            Collection::new(store, RESET_REQUESTS_KEY, timeout),
            directory.clone(),
            ledger.clone(),
            notifier,
            clock,
            cfg.recovery,
        ));
        Self { directory, ledger, authenticator, recovery, businesses }
    }
}
