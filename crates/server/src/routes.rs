use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod businesses;
pub mod public;
pub mod recovery;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, session and super-admin routes.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/access-requests", post(public::submit_request))
        .route("/access/status", get(public::access_status))
        .route("/businesses", get(businesses::list))
        .route("/admin/login", post(admin::login));

    let session = Router::new()
        .route("/auth/setup", post(auth::setup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/recovery/request", post(recovery::request))
        .route("/recovery/validate", post(recovery::validate))
        .route("/recovery/reset", post(recovery::reset));

    let admin_routes = Router::new()
        .route("/admin/requests", get(admin::list_requests))
        .route("/admin/requests/:id/approve", post(admin::approve))
        .route("/admin/requests/:id/reject", post(admin::reject))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/users/:id/restrict", post(admin::restrict))
        .route("/admin/restricted", get(admin::list_restricted))
        .route("/admin/restricted/:id/readmit", post(admin::readmit))
        .route("/admin/businesses", post(businesses::create))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_super_admin));

    public
        .merge(session)
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
