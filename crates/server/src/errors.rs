use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// Error returned by every handler; rendered as `{"error", "code"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("super-admin secret required")]
    AdminRequired,
    #[error("no session")]
    NoSession,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(e) => match e {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Authentication => StatusCode::UNAUTHORIZED,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::Delivery(_) => StatusCode::BAD_GATEWAY,
                ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ServiceError::Storage(_) | ServiceError::Hash(_) | ServiceError::Token(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::AdminRequired | ApiError::NoSession => StatusCode::UNAUTHORIZED,
        }
    }

    fn code(&self) -> u16 {
        match self {
            ApiError::Service(e) => e.code(),
            ApiError::AdminRequired | ApiError::NoSession => ServiceError::Authentication.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(error = %msg, %status, "request failed");
        }
        (status, Json(serde_json::json!({"error": msg, "code": self.code()}))).into_response()
    }
}
