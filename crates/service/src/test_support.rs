#![cfg(test)]
//! Shared fixtures for component tests: an in-memory store that can be made
//! to lose races, a manual clock and a notifier that remembers what it sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Barrier;

use models::access_request::NewAccessRequest;
use models::user::AuthorizedUser;
use models::user_credentials::CredentialInput;

use crate::access::{AccessConfig, AccessControl};
use crate::auth::{AuthConfig, HashCost};
use crate::clock::ManualClock;
use crate::errors::ServiceError;
use crate::recovery::{Notifier, RecoveryConfig};
use crate::storage::{DurableStore, MemoryStore};

pub const SUPER_ADMIN_SECRET: &str = "root-secret";

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn last_code(&self, address: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == address)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, address: &str, code: &str) -> Result<(), ServiceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Delivery("relay unavailable".into()));
        }
        self.sent.lock().unwrap().push((address.to_string(), code.to_string()));
        Ok(())
    }
}

struct ReadGate {
    key: &'static str,
    barrier: Arc<Barrier>,
    remaining: usize,
}

/// [`MemoryStore`] with two knobs: writes to one key can be refused, and the
/// next reads of one key can be held until they have all read the same value.
#[derive(Default)]
pub struct ScriptedStore {
    inner: MemoryStore,
    refused: Mutex<Option<&'static str>>,
    gate: Mutex<Option<ReadGate>>,
}

impl ScriptedStore {
    /// Every compare-and-set on `key` reports a lost race; `None` clears it.
    pub fn refuse_writes(&self, key: Option<&'static str>) {
        *self.refused.lock().unwrap() = key;
    }

    /// The next `readers` reads of `key` wait for each other before
    /// returning, so all of them see the same snapshot.
    pub fn hold_reads(&self, key: &'static str, readers: usize) {
        *self.gate.lock().unwrap() = Some(ReadGate { key, barrier: Arc::new(Barrier::new(readers)), remaining: readers });
    }

    fn gate_for(&self, key: &str) -> Option<Arc<Barrier>> {
        let mut slot = self.gate.lock().unwrap();
        let gate = slot.as_mut().filter(|g| g.key == key)?;
        gate.remaining -= 1;
        let barrier = gate.barrier.clone();
        if gate.remaining == 0 {
            *slot = None;
        }
        Some(barrier)
    }
}

#[async_trait]
impl DurableStore for ScriptedStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, ServiceError> {
        let value = self.inner.get(key).await?;
        if let Some(barrier) = self.gate_for(key) {
            barrier.wait().await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ServiceError> {
        self.inner.set(key, value).await
    }

    async fn list(&self) -> Result<Vec<String>, ServiceError> {
        self.inner.list().await
    }

    async fn compare_and_set(&self, key: &str, expected: Option<Value>, value: Value) -> Result<bool, ServiceError> {
        if self.refused.lock().unwrap().map_or(false, |k| k == key) {
            return Ok(false);
        }
        self.inner.compare_and_set(key, expected, value).await
    }
}

pub struct Harness {
    pub access: AccessControl,
    pub store: Arc<ScriptedStore>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
    let notifier = Arc::new(RecordingNotifier::default());
    let cfg = AccessConfig {
        auth: AuthConfig {
            super_admin_secret: SUPER_ADMIN_SECRET.into(),
            jwt_secret: Some("test-signing-key".into()),
            hash_cost: HashCost::minimal(),
            ..Default::default()
        },
        recovery: RecoveryConfig::default(),
        store_timeout: Duration::from_secs(1),
    };
    let store = Arc::new(ScriptedStore::default());
    let access = AccessControl::new(store.clone(), notifier.clone(), clock.clone(), cfg);
    Harness { access, store, clock, notifier }
}

pub fn creds(username: &str, password: &str) -> CredentialInput {
    CredentialInput { username: username.into(), password: password.into() }
}

impl Harness {
    /// Submit and approve a request for `email`.
    pub async fn onboard(&self, full_name: &str, email: &str) -> AuthorizedUser {
        let req = self
            .access
            .directory
            .submit_request(NewAccessRequest {
                full_name: full_name.into(),
                email: email.into(),
                business_name: format!("{full_name} Store"),
                business_description: "Retail".into(),
            })
            .await
            .unwrap();
        self.access.directory.approve(req.id).await.unwrap();
        self.access.directory.find_authorized(email).await.unwrap().unwrap()
    }

    /// Onboard and set up the `<name>_admin` / `<name>_op` pair.
    pub async fn onboard_with_credentials(&self, name: &str, email: &str) -> AuthorizedUser {
        self.onboard(name, email).await;
        let login = name.to_lowercase();
        self.access
            .ledger
            .setup_dual_credentials(
                email,
                creds(&format!("{login}_admin"), "senha123"),
                creds(&format!("{login}_op"), "outrasenha"),
            )
            .await
            .unwrap();
        self.access.directory.find_authorized(email).await.unwrap().unwrap()
    }
}
