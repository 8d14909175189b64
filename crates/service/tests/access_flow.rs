use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use models::access_request::{NewAccessRequest, RequestStatus};
use models::user::PasswordStatus;
use models::user_credentials::{CredentialInput, Role};
use service::access::{AccessConfig, AccessControl};
use service::auth::{AuthConfig, HashCost};
use service::clock::SystemClock;
use service::errors::ServiceError;
use service::recovery::Notifier;
use service::storage::{JsonFileStore, MemoryStore};

#[derive(Default)]
struct Outbox(Mutex<Vec<(String, String)>>);

#[async_trait]
impl Notifier for Outbox {
    async fn send(&self, address: &str, code: &str) -> Result<(), ServiceError> {
        self.0.lock().unwrap().push((address.into(), code.into()));
        Ok(())
    }
}

fn config() -> AccessConfig {
    AccessConfig {
        auth: AuthConfig {
            super_admin_secret: "root".into(),
            jwt_secret: Some("flow-secret".into()),
            hash_cost: HashCost::minimal(),
            ..Default::default()
        },
        store_timeout: Duration::from_secs(1),
        ..Default::default()
    }
}

fn access(outbox: Arc<Outbox>) -> AccessControl {
    AccessControl::new(Arc::new(MemoryStore::default()), outbox, Arc::new(SystemClock), config())
}

fn ana_request() -> NewAccessRequest {
    NewAccessRequest {
        full_name: "Ana Silva".into(),
        email: "ana@x.com".into(),
        business_name: "Ana Store".into(),
        business_description: "Clothing".into(),
    }
}

fn pair() -> (CredentialInput, CredentialInput) {
    (
        CredentialInput { username: "ana_admin".into(), password: "senha123".into() },
        CredentialInput { username: "ana_op".into(), password: "outrasenha".into() },
    )
}

#[tokio::test]
async fn onboarding_end_to_end() -> Result<(), anyhow::Error> {
    let access = access(Arc::new(Outbox::default()));

    let req = access.directory.submit_request(ana_request()).await?;
    assert_eq!(req.status, RequestStatus::Pending);
    assert_eq!(access.directory.get_request(req.id).await?.email, "ana@x.com");

    access.directory.approve(req.id).await?;
    assert_eq!(access.directory.password_status("ana@x.com").await?, PasswordStatus::NeedsSetup);

    let (admin, operator) = pair();
    let session = access.ledger.setup_dual_credentials("ana@x.com", admin, operator).await?;
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.username, "ana_admin");
    assert_eq!(access.directory.password_status("ana@x.com").await?, PasswordStatus::Ready);

    let op = access.authenticator.login("ana@x.com", "ana_op", "outrasenha").await?;
    assert_eq!(op.role, Role::Operator);
    assert_eq!(op.name, "Ana Silva");

    let crossed = access.authenticator.login("ana@x.com", "ana_admin", "outrasenha").await;
    assert!(matches!(crossed, Err(ServiceError::Authentication)));
    Ok(())
}

#[tokio::test]
async fn double_approval_keeps_one_identity() -> Result<(), anyhow::Error> {
    let access = access(Arc::new(Outbox::default()));
    let req = access.directory.submit_request(ana_request()).await?;
    access.directory.approve(req.id).await?;
    access.directory.approve(req.id).await?;
    assert_eq!(access.directory.list_authorized().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn revoke_and_restore_cycle() -> Result<(), anyhow::Error> {
    let access = access(Arc::new(Outbox::default()));
    let req = access.directory.submit_request(ana_request()).await?;
    access.directory.approve(req.id).await?;
    let (admin, operator) = pair();
    access.ledger.setup_dual_credentials("ana@x.com", admin, operator).await?;

    let user = access.directory.find_authorized("ana@x.com").await?.unwrap();
    access.directory.restrict(user.id, "chargeback").await?;
    assert!(!access.directory.check_email_access("ana@x.com").await?);
    assert!(access.authenticator.login("ana@x.com", "ana_admin", "senha123").await.is_err());

    let restricted = access.directory.list_restricted().await?.remove(0);
    assert_eq!(restricted.original_approval_date, user.approved_date);
    access.directory.readmit(restricted.id).await?;
    assert_eq!(access.directory.password_status("ana@x.com").await?, PasswordStatus::NeedsSetup);
    assert!(access.authenticator.login("ana@x.com", "ana_admin", "senha123").await.is_err());
    Ok(())
}

#[tokio::test]
async fn password_recovery_round() -> Result<(), anyhow::Error> {
    let outbox = Arc::new(Outbox::default());
    let access = access(outbox.clone());

    let req = access.directory.submit_request(ana_request()).await?;
    access.directory.approve(req.id).await?;
    assert!(!access.recovery.request_reset("ana@x.com").await?);
    assert!(access.recovery.live_request("ana@x.com").await?.is_none());

    let (admin, operator) = pair();
    access.ledger.setup_dual_credentials("ana@x.com", admin, operator).await?;
    assert!(access.recovery.request_reset("ana@x.com").await?);
    let code = outbox.0.lock().unwrap().last().map(|(_, code)| code.clone()).unwrap();

    assert!(access.recovery.validate_code("ana@x.com", &code).await?);
    assert!(access.recovery.reset_password("ana@x.com", Role::Operator, &code, "nova-senha").await?);
    assert!(access.authenticator.login("ana@x.com", "ana_op", "nova-senha").await.is_ok());
    assert!(access.authenticator.login("ana@x.com", "ana_admin", "senha123").await.is_ok());
    Ok(())
}

#[tokio::test]
async fn file_store_survives_restart() -> Result<(), anyhow::Error> {
    let path = std::env::temp_dir().join(format!("access-flow-{}.json", uuid::Uuid::new_v4()));
    {
        let store = JsonFileStore::open(&path).await?;
        let access = AccessControl::new(store, Arc::new(Outbox::default()), Arc::new(SystemClock), config());
        let req = access.directory.submit_request(ana_request()).await?;
        access.directory.approve(req.id).await?;
        let (admin, operator) = pair();
        access.ledger.setup_dual_credentials("ana@x.com", admin, operator).await?;
    }

    let store = JsonFileStore::open(&path).await?;
    let access = AccessControl::new(store, Arc::new(Outbox::default()), Arc::new(SystemClock), config());
    let session = access.authenticator.login("ana@x.com", "ana_admin", "senha123").await?;
    assert_eq!(session.role, Role::Admin);

    let _ = std::fs::remove_file(&path);
    Ok(())
}
