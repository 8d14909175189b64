use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An approved identity, eligible to configure credentials and log in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorizedUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub business_name: String,
    pub approved_date: DateTime<Utc>,
    pub has_setup_password: bool,
}

/// A revoked identity kept for audit and readmission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestrictedUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub business_name: String,
    pub original_approval_date: DateTime<Utc>,
    pub restriction_date: DateTime<Utc>,
    pub restriction_reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PasswordStatus {
    NotFound,
    NeedsSetup,
    Ready,
}

impl AuthorizedUser {
    pub fn restrict(self, reason: String, now: DateTime<Utc>) -> RestrictedUser {
        RestrictedUser {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            business_name: self.business_name,
            original_approval_date: self.approved_date,
            restriction_date: now,
            restriction_reason: reason,
        }
    }

    pub fn password_status(&self) -> PasswordStatus {
        if self.has_setup_password { PasswordStatus::Ready } else { PasswordStatus::NeedsSetup }
    }
}

impl RestrictedUser {
    /// Readmission starts a new approval cycle: fresh date, credentials must be set up again.
    pub fn readmit(self, now: DateTime<Utc>) -> AuthorizedUser {
        AuthorizedUser {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            business_name: self.business_name,
            approved_date: now,
            has_setup_password: false,
        }
    }
}
