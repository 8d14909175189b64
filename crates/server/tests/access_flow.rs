use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use service::access::{AccessConfig, AccessControl};
use service::auth::{AuthConfig, HashCost};
use service::clock::SystemClock;
use service::errors::ServiceError;
use service::recovery::Notifier;
use service::storage::MemoryStore;

use server::routes;
use server::state::AppState;

const ADMIN_SECRET: &str = "console-secret";

#[derive(Default)]
struct Outbox(Mutex<Vec<String>>);

#[async_trait]
impl Notifier for Outbox {
    async fn send(&self, _address: &str, code: &str) -> Result<(), ServiceError> {
        self.0.lock().unwrap().push(code.to_string());
        Ok(())
    }
}

fn app(outbox: Arc<Outbox>) -> Router {
    let cfg = AccessConfig {
        auth: AuthConfig {
            super_admin_secret: ADMIN_SECRET.into(),
            jwt_secret: Some("http-test-secret".into()),
            hash_cost: HashCost::minimal(),
            ..Default::default()
        },
        ..Default::default()
    };
    let access = AccessControl::new(Arc::new(MemoryStore::default()), outbox, Arc::new(SystemClock), cfg);
    routes::build_router(AppState::new(access), tower_http::cors::CorsLayer::very_permissive())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Admin-Secret", ADMIN_SECRET)
        .header(header::CONTENT_TYPE, "application/json");
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    builder.body(body).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

async fn onboard(app: &Router) -> String {
    let (status, req) = send(
        app,
        post(
            "/access-requests",
            json!({"full_name": "Ana Silva", "email": "ana@x.com", "business_name": "Ana Store", "business_description": "Clothing"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = req["id"].as_str().unwrap().to_string();
    let (status, _) = send(app, admin("POST", &format!("/admin/requests/{id}/approve"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    id
}

fn setup_body(op_confirm: &str) -> Value {
    json!({
        "email": "ana@x.com",
        "admin": {"username": "ana_admin", "password": "senha123", "confirm_password": "senha123"},
        "operator": {"username": "ana_op", "password": "outrasenha", "confirm_password": op_confirm}
    })
}

#[tokio::test]
async fn onboarding_over_http() -> Result<(), anyhow::Error> {
    let app = app(Arc::new(Outbox::default()));
    onboard(&app).await;

    let status_req = Request::builder().uri("/access/status?email=ana@x.com").body(Body::empty())?;
    let (status, body) = send(&app, status_req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["password_status"], "needs_setup");

    let (status, body) = send(&app, post("/auth/setup", setup_body("typo"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    let (status, session) = send(&app, post("/auth/setup", setup_body("outrasenha"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["role"], "admin");

    let (status, _) = send(&app, post("/auth/setup", setup_body("outrasenha"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, session) =
        send(&app, post("/auth/login", json!({"email": "ana@x.com", "username": "ana_op", "password": "outrasenha"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["role"], "operator");

    let token = session["token"].as_str().unwrap();
    let me = Request::builder().uri("/auth/me").header(header::AUTHORIZATION, format!("Bearer {token}")).body(Body::empty())?;
    let (status, body) = send(&app, me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ana_op");

    let (status, body) =
        send(&app, post("/auth/login", json!({"email": "ana@x.com", "username": "ana_op", "password": "senha123"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_secret() -> Result<(), anyhow::Error> {
    let app = app(Arc::new(Outbox::default()));
    let req = Request::builder().uri("/admin/users").body(Body::empty())?;
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, post("/admin/login", json!({"password": "nope"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, post("/admin/login", json!({"password": ADMIN_SECRET}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorized"], true);
    Ok(())
}

#[tokio::test]
async fn business_creation_is_admin_only() -> Result<(), anyhow::Error> {
    let app = app(Arc::new(Outbox::default()));
    onboard(&app).await;
    send(&app, post("/auth/setup", setup_body("outrasenha"))).await;
    let (_, users) = send(&app, admin("GET", "/admin/users", None)).await;
    let owner_id = users[0]["id"].as_str().unwrap().to_string();
    let business = json!({"name": "Shadow Store", "owner_id": owner_id});

    let (status, _) = send(&app, post("/businesses", business.clone())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = send(&app, post("/admin/businesses", business.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let login = json!({"email": "ana@x.com", "username": "ana_admin", "password": "senha123"});
    let (_, session) = send(&app, post("/auth/login", login.clone())).await;
    assert_eq!(session["business_id"], Value::Null);

    let (status, created) = send(&app, admin("POST", "/admin/businesses", Some(business))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, session) = send(&app, post("/auth/login", login)).await;
    assert_eq!(session["business_id"], created["id"]);

    let (status, list) = send(&app, Request::builder().uri("/businesses").body(Body::empty())?).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn restrict_blocks_login_until_readmitted_and_set_up() -> Result<(), anyhow::Error> {
    let app = app(Arc::new(Outbox::default()));
    onboard(&app).await;
    send(&app, post("/auth/setup", setup_body("outrasenha"))).await;

    let (_, users) = send(&app, admin("GET", "/admin/users", None)).await;
    let user_id = users[0]["id"].as_str().unwrap().to_string();
    let (status, _) =
        send(&app, admin("POST", &format!("/admin/users/{user_id}/restrict"), Some(json!({"reason": "chargeback"})))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let login = json!({"email": "ana@x.com", "username": "ana_admin", "password": "senha123"});
    let (status, _) = send(&app, post("/auth/login", login.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, restricted) = send(&app, admin("GET", "/admin/restricted", None)).await;
    let restricted_id = restricted[0]["id"].as_str().unwrap().to_string();
    let (status, _) = send(&app, admin("POST", &format!("/admin/restricted/{restricted_id}/readmit"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, post("/auth/login", login.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    send(&app, post("/auth/setup", setup_body("outrasenha"))).await;
    let (status, _) = send(&app, post("/auth/login", login)).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn recovery_over_http() -> Result<(), anyhow::Error> {
    let outbox = Arc::new(Outbox::default());
    let app = app(outbox.clone());
    onboard(&app).await;

    let (_, body) = send(&app, post("/recovery/request", json!({"email": "ana@x.com"}))).await;
    assert_eq!(body["ok"], false);

    send(&app, post("/auth/setup", setup_body("outrasenha"))).await;
    let (_, body) = send(&app, post("/recovery/request", json!({"email": "ana@x.com"}))).await;
    assert_eq!(body["ok"], true);
    let code = outbox.0.lock().unwrap().last().cloned().unwrap();

    let (_, body) = send(&app, post("/recovery/validate", json!({"email": "ana@x.com", "code": code}))).await;
    assert_eq!(body["ok"], true);

    let (status, body) = send(
        &app,
        post("/recovery/reset", json!({"email": "ana@x.com", "role": "admin", "code": code, "new_password": "nova-senha"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, _) =
        send(&app, post("/auth/login", json!({"email": "ana@x.com", "username": "ana_admin", "password": "nova-senha"}))).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
