use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Deliberately carries no detail about which field was wrong.
    #[error("invalid credentials")]
    Authentication,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Authentication => 1004,
            ServiceError::Conflict(_) => 1005,
            ServiceError::Delivery(_) => 1301,
            ServiceError::Storage(_) => 1200,
            ServiceError::Timeout(_) => 1201,
            ServiceError::Hash(_) => 1101,
            ServiceError::Token(_) => 1102,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_error_is_undifferentiated() {
        assert_eq!(ServiceError::Authentication.to_string(), "invalid credentials");
    }

    #[test]
    fn model_validation_maps_to_validation() {
        let err: ServiceError = ModelError::Validation("email is required".into()).into();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "email is required"));
        assert_eq!(err.code(), 1001);
    }
}
