use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::access_request::{validate_required, AccessRequest, NewAccessRequest, RequestStatus};
use models::same_email;
use models::user::{AuthorizedUser, PasswordStatus, RestrictedUser};

use crate::clock::Clock;
use crate::errors::ServiceError;
use crate::storage::Collection;

pub const DIRECTORY_KEY: &str = "directory";

/// Everything the directory owns, persisted as one document so that moves
/// between the authorized and restricted lists are a single write.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DirectoryRecords {
    #[serde(default)]
    pub requests: Vec<AccessRequest>,
    #[serde(default)]
    pub authorized: Vec<AuthorizedUser>,
    #[serde(default)]
    pub restricted: Vec<RestrictedUser>,
}

impl DirectoryRecords {
    fn authorized_by_email(&self, email: &str) -> Option<&AuthorizedUser> {
        self.authorized.iter().find(|u| same_email(&u.email, email))
    }
}

pub struct AccessDirectory {
    records: Collection<DirectoryRecords>,
    clock: Arc<dyn Clock>,
}

impl AccessDirectory {
    pub fn new(records: Collection<DirectoryRecords>, clock: Arc<dyn Clock>) -> Self {
        Self { records, clock }
    }

    /// Record a new pending request.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn submit_request(&self, input: NewAccessRequest) -> Result<AccessRequest, ServiceError> {
        input.validate()?;
        let request = input.into_pending(Uuid::new_v4(), self.clock.now());
        let stored = request.clone();
        self.records
            .update(move |doc| {
                doc.requests.push(stored);
                Ok(())
            })
            .await?;
        info!(request_id = %request.id, "access_request_submitted");
        Ok(request)
    }

    pub async fn get_request(&self, request_id: Uuid) -> Result<AccessRequest, ServiceError> {
        self.records
            .load()
            .await?
            .requests
            .into_iter()
            .find(|r| r.id == request_id)
            .ok_or_else(|| ServiceError::not_found("access request"))
    }

    /// Requests in submission order, optionally filtered by status.
    pub async fn list_requests(&self, status: Option<RequestStatus>) -> Result<Vec<AccessRequest>, ServiceError> {
        let doc = self.records.load().await?;
        Ok(doc
            .requests
            .into_iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect())
    }

    /// Approve a pending request and create the matching authorized identity.
    /// Approving an already-approved request changes nothing.
    #[instrument(skip(self))]
    pub async fn approve(&self, request_id: Uuid) -> Result<(), ServiceError> {
        let now = self.clock.now();
        let created = self
            .records
            .update(|doc| {
                let idx = doc
                    .requests
                    .iter()
                    .position(|r| r.id == request_id)
                    .ok_or_else(|| ServiceError::not_found("pending access request"))?;
                match doc.requests[idx].status {
                    RequestStatus::Approved => return Ok(None),
                    RequestStatus::Rejected => return Err(ServiceError::not_found("pending access request")),
                    RequestStatus::Pending => {}
                }
                doc.requests[idx].status = RequestStatus::Approved;
                let req = &doc.requests[idx];
                if doc.authorized_by_email(&req.email).is_some() {
                    return Ok(None);
                }
                let user = AuthorizedUser {
                    id: Uuid::new_v4(),
                    full_name: req.full_name.clone(),
                    email: req.email.clone(),
                    business_name: req.business_name.clone(),
                    approved_date: now,
                    has_setup_password: false,
                };
                let id = user.id;
                doc.authorized.push(user);
                Ok(Some(id))
            })
            .await?;
        match created {
            Some(user_id) => info!(%request_id, %user_id, "access_request_approved"),
            None => debug!(%request_id, "approval was a no-op"),
        }
        Ok(())
    }

    /// Reject a pending request. Approved requests cannot be rejected.
    #[instrument(skip(self, reason))]
    pub async fn reject(&self, request_id: Uuid, reason: &str) -> Result<(), ServiceError> {
        let reason = reason.trim();
        self.records
            .update(|doc| {
                let req = doc
                    .requests
                    .iter_mut()
                    .find(|r| r.id == request_id)
                    .ok_or_else(|| ServiceError::not_found("access request"))?;
                if req.status == RequestStatus::Approved {
                    return Err(ServiceError::Validation("request was already approved".into()));
                }
                req.status = RequestStatus::Rejected;
                req.rejection_reason = (!reason.is_empty()).then(|| reason.to_string());
                Ok(())
            })
            .await?;
        info!(%request_id, "access_request_rejected");
        Ok(())
    }

    pub async fn list_authorized(&self) -> Result<Vec<AuthorizedUser>, ServiceError> {
        Ok(self.records.load().await?.authorized)
    }

    pub async fn list_restricted(&self) -> Result<Vec<RestrictedUser>, ServiceError> {
        Ok(self.records.load().await?.restricted)
    }

    pub async fn find_authorized(&self, email: &str) -> Result<Option<AuthorizedUser>, ServiceError> {
        Ok(self.records.load().await?.authorized_by_email(email).cloned())
    }

    pub async fn find_authorized_by_id(&self, user_id: Uuid) -> Result<Option<AuthorizedUser>, ServiceError> {
        Ok(self.records.load().await?.authorized.into_iter().find(|u| u.id == user_id))
    }

    /// Revoke access: the authorized identity becomes a restricted one in a
    /// single write.
    #[instrument(skip(self, reason))]
    pub async fn restrict(&self, user_id: Uuid, reason: &str) -> Result<(), ServiceError> {
        validate_required("restriction reason", reason)?;
        let now = self.clock.now();
        let reason = reason.trim().to_string();
        self.records
            .update(|doc| {
                let idx = doc
                    .authorized
                    .iter()
                    .position(|u| u.id == user_id)
                    .ok_or_else(|| ServiceError::not_found("authorized user"))?;
                let user = doc.authorized.remove(idx);
                doc.restricted.push(user.restrict(reason, now));
                Ok(())
            })
            .await?;
        info!(%user_id, "user_restricted");
        Ok(())
    }

    /// Restore a restricted identity. It must set up credentials again.
    #[instrument(skip(self))]
    pub async fn readmit(&self, restricted_user_id: Uuid) -> Result<(), ServiceError> {
        let now = self.clock.now();
        self.records
            .update(|doc| {
                let idx = doc
                    .restricted
                    .iter()
                    .position(|u| u.id == restricted_user_id)
                    .ok_or_else(|| ServiceError::not_found("restricted user"))?;
                if doc.authorized_by_email(&doc.restricted[idx].email).is_some() {
                    return Err(ServiceError::Validation(
                        "another active user already holds this email".into(),
                    ));
                }
                let user = doc.restricted.remove(idx);
                doc.authorized.push(user.readmit(now));
                Ok(())
            })
            .await?;
        info!(user_id = %restricted_user_id, "user_readmitted");
        Ok(())
    }

    /// Permanently remove an authorized identity. Credentials are left to
    /// the ledger.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid) -> Result<(), ServiceError> {
        self.records
            .update(|doc| {
                let before = doc.authorized.len();
                doc.authorized.retain(|u| u.id != user_id);
                if doc.authorized.len() == before {
                    return Err(ServiceError::not_found("authorized user"));
                }
                Ok(())
            })
            .await?;
        info!(%user_id, "user_deleted");
        Ok(())
    }

    pub async fn check_email_access(&self, email: &str) -> Result<bool, ServiceError> {
        Ok(self.find_authorized(email).await?.is_some())
    }

    pub async fn password_status(&self, email: &str) -> Result<PasswordStatus, ServiceError> {
        Ok(self
            .find_authorized(email)
            .await?
            .map_or(PasswordStatus::NotFound, |u| u.password_status()))
    }

    /// Flag the identity as having completed credential setup. Happens once
    /// per approval cycle; a second call is a `Conflict`.
    pub(crate) async fn mark_password_setup(&self, email: &str) -> Result<AuthorizedUser, ServiceError> {
        self.records
            .update(|doc| {
                let user = doc
                    .authorized
                    .iter_mut()
                    .find(|u| same_email(&u.email, email))
                    .ok_or_else(|| ServiceError::not_found("authorized user"))?;
                if user.has_setup_password {
                    return Err(ServiceError::Conflict("credentials were already set up".into()));
                }
                user.has_setup_password = true;
                Ok(user.clone())
            })
            .await
    }
}
