//! Recovery Service: time-boxed reset codes and password rotation.

pub mod notifier;
pub mod service;

use chrono::Duration;

pub use notifier::{Notifier, TracingNotifier, WebhookNotifier};
pub use service::RecoveryService;

#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Lifetime of an issued code.
    pub code_ttl: Duration,
    /// Upper bound on a single notifier dispatch.
    pub delivery_timeout: std::time::Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self { code_ttl: Duration::minutes(30), delivery_timeout: std::time::Duration::from_secs(5) }
    }
}
