use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use common::env::ensure_env;
use configs::AppConfig;
use service::access::{AccessConfig, AccessControl};
use service::auth::{AuthConfig, HashCost};
use service::clock::SystemClock;
use service::recovery::{Notifier, RecoveryConfig, TracingNotifier, WebhookNotifier};
use service::storage::JsonFileStore;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Translate file/env configuration into component configuration.
pub fn access_config(cfg: &AppConfig) -> AccessConfig {
    AccessConfig {
        auth: AuthConfig {
            super_admin_secret: cfg.auth.super_admin_secret.clone(),
            jwt_secret: cfg.auth.jwt_secret.clone(),
            session_ttl: chrono::Duration::hours(cfg.auth.session_ttl_hours as i64),
            hash_cost: HashCost {
                memory_kib: cfg.auth.hash_memory_kib,
                iterations: cfg.auth.hash_iterations,
                parallelism: cfg.auth.hash_parallelism,
            },
        },
        recovery: RecoveryConfig {
            code_ttl: chrono::Duration::minutes(cfg.recovery.code_ttl_minutes as i64),
            delivery_timeout: Duration::from_millis(cfg.recovery.delivery_timeout_ms),
        },
        store_timeout: Duration::from_millis(cfg.storage.op_timeout_ms),
    }
}

fn build_notifier(cfg: &AppConfig) -> Arc<dyn Notifier> {
    match &cfg.recovery.webhook_url {
        Some(url) => {
            info!(%url, "reset codes delivered through webhook");
            Arc::new(WebhookNotifier::new(url.clone()))
        }
        None => {
            warn!("no webhook configured; reset codes go to the debug log, which is meant for development only");
            Arc::new(TracingNotifier)
        }
    }
}

/// Public entry: build the app from a validated config and serve it.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    ensure_env(&cfg.storage.data_dir, &cfg.storage.file).await?;
    let store = JsonFileStore::open(Path::new(&cfg.storage.data_dir).join(&cfg.storage.file)).await?;

    let access = AccessControl::new(store, build_notifier(&cfg), Arc::new(SystemClock), access_config(&cfg));
    let app: Router = routes::build_router(AppState::new(access), build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
