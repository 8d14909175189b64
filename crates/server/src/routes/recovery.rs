use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use models::user_credentials::Role;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RequestInput {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ValidateInput {
    pub email: String,
    pub code: String,
}

#[derive(Deserialize)]
pub struct ResetInput {
    pub email: String,
    pub role: Role,
    pub code: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct Outcome {
    pub ok: bool,
}

pub async fn request(State(state): State<AppState>, Json(input): Json<RequestInput>) -> Result<Json<Outcome>, ApiError> {
    let ok = state.access.recovery.request_reset(&input.email).await?;
    Ok(Json(Outcome { ok }))
}

pub async fn validate(State(state): State<AppState>, Json(input): Json<ValidateInput>) -> Result<Json<Outcome>, ApiError> {
    let ok = state.access.recovery.validate_code(&input.email, &input.code).await?;
    Ok(Json(Outcome { ok }))
}

pub async fn reset(State(state): State<AppState>, Json(input): Json<ResetInput>) -> Result<Json<Outcome>, ApiError> {
    let ok = state
        .access
        .recovery
        .reset_password(&input.email, input.role, &input.code, &input.new_password)
        .await?;
    Ok(Json(Outcome { ok }))
}
