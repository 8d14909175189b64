//! Super-admin console: operates the Access Directory itself.

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::access_request::{AccessRequest, RequestStatus};
use models::user::{AuthorizedUser, RestrictedUser};

use crate::errors::ApiError;
use crate::state::AppState;

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Rejects requests whose `X-Admin-Secret` header does not pass the
/// super-admin check.
pub async fn require_super_admin(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    let presented = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !state.access.authenticator.super_admin_login(presented) {
        tracing::warn!(path = %req.uri().path(), "super-admin secret missing or wrong");
        return Err(ApiError::AdminRequired);
    }
    Ok(next.run(req).await)
}

#[derive(Deserialize)]
pub struct AdminLoginInput {
    pub password: String,
}

#[derive(Serialize)]
pub struct AdminLoginOutput {
    pub authorized: bool,
}

pub async fn login(State(state): State<AppState>, Json(input): Json<AdminLoginInput>) -> Result<Json<AdminLoginOutput>, ApiError> {
    if state.access.authenticator.super_admin_login(&input.password) {
        Ok(Json(AdminLoginOutput { authorized: true }))
    } else {
        Err(ApiError::AdminRequired)
    }
}

#[derive(Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<Vec<AccessRequest>>, ApiError> {
    Ok(Json(state.access.directory.list_requests(filter.status).await?))
}

pub async fn approve(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.access.directory.approve(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ReasonInput {
    #[serde(default)]
    pub reason: String,
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReasonInput>,
) -> Result<StatusCode, ApiError> {
    state.access.directory.reject(id, &input.reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<AuthorizedUser>>, ApiError> {
    Ok(Json(state.access.directory.list_authorized().await?))
}

pub async fn list_restricted(State(state): State<AppState>) -> Result<Json<Vec<RestrictedUser>>, ApiError> {
    Ok(Json(state.access.directory.list_restricted().await?))
}

pub async fn restrict(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReasonInput>,
) -> Result<StatusCode, ApiError> {
    state.access.directory.restrict(id, &input.reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn readmit(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.access.directory.readmit(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct DeleteOptions {
    /// Also drop the identity's credential pair.
    #[serde(default)]
    pub purge_credentials: bool,
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(opts): Query<DeleteOptions>,
) -> Result<StatusCode, ApiError> {
    let directory = &state.access.directory;
    let user = directory
        .find_authorized_by_id(id)
        .await?
        .ok_or_else(|| service::errors::ServiceError::not_found("authorized user"))?;
    directory.delete(id).await?;
    if opts.purge_credentials {
        let removed = state.access.ledger.purge(&user.email).await?;
        info!(user_id = %id, removed, "deleted user credentials purged");
    }
    Ok(StatusCode::NO_CONTENT)
}
