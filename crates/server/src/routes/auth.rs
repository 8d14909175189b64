use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use models::session::Session;
use models::user_credentials::CredentialInput;
use service::errors::ServiceError;

use crate::errors::ApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// One credential of the setup form, with its confirmation field.
#[derive(Deserialize)]
pub struct ConfirmedCredential {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl ConfirmedCredential {
    fn confirmed(self, role: &str) -> Result<CredentialInput, ApiError> {
        if self.password != self.confirm_password {
            return Err(ServiceError::Validation(format!("{role} password confirmation does not match")).into());
        }
        Ok(CredentialInput { username: self.username, password: self.password })
    }
}

#[derive(Deserialize)]
pub struct SetupInput {
    pub email: String,
    pub admin: ConfirmedCredential,
    pub operator: ConfirmedCredential,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub username: String,
    pub password: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn with_session_cookie(jar: CookieJar, session: &Session) -> CookieJar {
    match &session.token {
        Some(token) => jar.add(session_cookie(token.clone())),
        None => jar,
    }
}

/// `Authorization: Bearer <token>` first, then the `auth_token` cookie.
fn presented_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);
    bearer.or_else(|| jar.get(AUTH_COOKIE).map(|c| c.value().to_string())).filter(|t| !t.is_empty())
}

async fn current_session(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Result<Session, ApiError> {
    let token = presented_token(headers, jar).ok_or(ApiError::NoSession)?;
    Ok(state.access.authenticator.verify_token(&token).await?)
}

pub async fn setup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<SetupInput>,
) -> Result<(CookieJar, Json<Session>), ApiError> {
    let admin = input.admin.confirmed("admin")?;
    let operator = input.operator.confirmed("operator")?;
    let session = state.access.ledger.setup_dual_credentials(&input.email, admin, operator).await?;
    Ok((with_session_cookie(jar, &session), Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<Session>), ApiError> {
    let session = state.access.authenticator.login(&input.email, &input.username, &input.password).await?;
    Ok((with_session_cookie(jar, &session), Json(session)))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Ok(session) = current_session(&state, &headers, &jar).await {
        state.access.authenticator.logout(session);
    }
    (jar.remove(Cookie::build(AUTH_COOKIE).path("/")), StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Result<Json<Session>, ApiError> {
    Ok(Json(current_session(&state, &headers, &jar).await?))
}
