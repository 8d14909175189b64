use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// An unapproved bid for access submitted by a prospective tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessRequest {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub business_name: String,
    pub business_description: String,
    pub request_date: DateTime<Utc>,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
}

/// Fields required to submit an access request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccessRequest {
    pub full_name: String,
    pub email: String,
    pub business_name: String,
    pub business_description: String,
}

pub fn validate_required(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    validate_required("email", email)?;
    if !email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

impl NewAccessRequest {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_required("full_name", &self.full_name)?;
        validate_email(&self.email)?;
        validate_required("business_name", &self.business_name)?;
        validate_required("business_description", &self.business_description)?;
        Ok(())
    }

    /// Build a pending request with trimmed fields.
    pub fn into_pending(self, id: Uuid, now: DateTime<Utc>) -> AccessRequest {
        AccessRequest {
            id,
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            business_name: self.business_name.trim().to_string(),
            business_description: self.business_description.trim().to_string(),
            request_date: now,
            status: RequestStatus::Pending,
            rejection_reason: None,
        }
    }
}
