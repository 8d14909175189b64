use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use uuid::Uuid;

use models::tenant::{Business, NewBusiness};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CreatedOutput {
    pub id: Uuid,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Business>>, ApiError> {
    Ok(Json(state.access.businesses.list().await?))
}

/// Mounted behind the super-admin guard: the owner decides which identity's
/// sessions carry the business.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewBusiness>,
) -> Result<(StatusCode, Json<CreatedOutput>), ApiError> {
    let id = state.access.businesses.create(input).await?;
    Ok((StatusCode::CREATED, Json(CreatedOutput { id })))
}
