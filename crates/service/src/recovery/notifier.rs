use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::ServiceError;

/// Delivers a reset code to an address. Failures surface as
/// [`ServiceError::Delivery`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, address: &str, code: &str) -> Result<(), ServiceError>;
}

/// Keeps the first character of a code and hides the rest.
pub fn mask_code(code: &str) -> String {
    code.chars().enumerate().map(|(i, c)| if i == 0 { c } else { '*' }).collect()
}

/// Writes the code to the log. For development and single-operator setups
/// where the super-admin relays codes by hand.
///
/// Only a masked code is logged at `info`; the usable code is emitted at
/// `debug`, so it shows up only when `service::recovery` is explicitly
/// raised to debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, address: &str, code: &str) -> Result<(), ServiceError> {
        info!(%address, code = %mask_code(code), "reset_code_dispatched");
        debug!(%address, %code, "reset_code_plaintext");
        Ok(())
    }
}

#[derive(Serialize)]
struct ResetCodePayload<'a> {
    address: &'a str,
    code: &'a str,
}

/// POSTs `{"address", "code"}` as JSON to a mail relay endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, address: &str, code: &str) -> Result<(), ServiceError> {
        self.client
            .post(&self.url)
            .json(&ResetCodePayload { address, code })
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| ServiceError::Delivery(e.to_string()))?;
        Ok(())
    }
}
