use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use models::access_request::{AccessRequest, NewAccessRequest};
use models::user::PasswordStatus;

use crate::errors::ApiError;
use crate::state::AppState;

pub async fn submit_request(
    State(state): State<AppState>,
    Json(input): Json<NewAccessRequest>,
) -> Result<(StatusCode, Json<AccessRequest>), ApiError> {
    let req = state.access.directory.submit_request(input).await?;
    Ok((StatusCode::CREATED, Json(req)))
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub email: String,
}

#[derive(Serialize)]
pub struct StatusOutput {
    pub has_access: bool,
    pub password_status: PasswordStatus,
}

pub async fn access_status(
    State(state): State<AppState>,
    Query(q): Query<StatusQuery>,
) -> Result<Json<StatusOutput>, ApiError> {
    let directory = &state.access.directory;
    let has_access = directory.check_email_access(&q.email).await?;
    let password_status = directory.password_status(&q.email).await?;
    Ok(Json(StatusOutput { has_access, password_status }))
}
