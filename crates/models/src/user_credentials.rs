use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One login credential of an authorized identity. Every identity that
/// completed setup owns exactly one `Admin` and one `Operator` record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    pub email: String,
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub role: Role,
    pub setup_date: DateTime<Utc>,
    pub last_password_change: Option<DateTime<Utc>>,
}

/// Plain username/password pair as submitted by the caller.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialInput {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialInput")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn validate_username(role: Role, username: &str) -> Result<(), ModelError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation(format!("{role} username is required")));
    }
    if trimmed.chars().count() < MIN_USERNAME_LEN {
        return Err(ModelError::Validation(format!(
            "{role} username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_password(role: Role, password: &str) -> Result<(), ModelError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ModelError::Validation(format!(
            "{role} password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Checks a dual-credential pair: both entries well-formed, usernames
/// distinct ignoring case, passwords distinct exactly.
pub fn validate_pair(admin: &CredentialInput, operator: &CredentialInput) -> Result<(), ModelError> {
    validate_username(Role::Admin, &admin.username)?;
    validate_username(Role::Operator, &operator.username)?;
    validate_password(Role::Admin, &admin.password)?;
    validate_password(Role::Operator, &operator.password)?;
    if admin.username.trim().to_lowercase() == operator.username.trim().to_lowercase() {
        return Err(ModelError::Validation(
            "admin and operator usernames must be different".into(),
        ));
    }
    if admin.password == operator.password {
        return Err(ModelError::Validation(
            "admin and operator passwords must be different".into(),
        ));
    }
    Ok(())
}
