use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RESET_CODE_LEN: usize = 6;

/// A live password-reset code for one email. At most one exists per email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetRequest {
    pub email: String,
    pub reset_code: String,
    pub expires_at: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
}

impl ResetRequest {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Codes are compared uppercase with surrounding whitespace removed.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
