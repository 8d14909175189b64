use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub recovery: RecoverySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_store_file")]
    pub file: String,
    #[serde(default = "default_op_timeout")]
    pub op_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), file: default_store_file(), op_timeout_ms: default_op_timeout() }
    }
}

/// One year.
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;
/// One day.
pub const MAX_CODE_TTL_MINUTES: u64 = 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub super_admin_secret: String,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            super_admin_secret: String::new(),
            jwt_secret: None,
            session_ttl_hours: default_session_ttl(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoverySettings {
    #[serde(default = "default_code_ttl")]
    pub code_ttl_minutes: u64,
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_ms: u64,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self { code_ttl_minutes: default_code_ttl(), delivery_timeout_ms: default_delivery_timeout(), webhook_url: None }
    }
}

fn default_data_dir() -> String { "data".into() }
fn default_store_file() -> String { "access.json".into() }
fn default_op_timeout() -> u64 { 2000 }
fn default_session_ttl() -> u64 { 12 }
// OWASP ASVS recommended Argon2id cost: m=19456 (19 MiB), t=2, p=1
fn default_hash_memory() -> u32 { 19456 }
fn default_hash_iterations() -> u32 { 2 }
fn default_hash_parallelism() -> u32 { 1 }
fn default_code_ttl() -> u64 { 30 }
fn default_delivery_timeout() -> u64 { 5000 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults plus
    /// environment variables when the file is absent.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if e.downcast_ref::<std::io::Error>().is_some() => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.storage.validate()?;
        self.recovery.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() || self.file.trim().is_empty() {
            return Err(anyhow!("storage.data_dir and storage.file must not be empty"));
        }
        if self.op_timeout_ms == 0 {
            return Err(anyhow!("storage.op_timeout_ms must be a positive number of milliseconds"));
        }
        Ok(())
    }
}

impl AuthSettings {
    pub fn normalize_from_env(&mut self) {
        // Secrets are usually injected through the environment rather than the TOML file.
        if self.super_admin_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("SUPER_ADMIN_SECRET") {
                self.super_admin_secret = secret;
            }
        }
        if self.jwt_secret.as_deref().map_or(true, |s| s.trim().is_empty()) {
            self.jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.super_admin_secret.trim().is_empty() {
            return Err(anyhow!("auth.super_admin_secret is empty; set it in config.toml or SUPER_ADMIN_SECRET"));
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(anyhow!("auth.session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}"));
        }
        if self.hash_iterations == 0 || self.hash_parallelism == 0 {
            return Err(anyhow!("auth.hash_iterations and auth.hash_parallelism must be >= 1"));
        }
        if self.hash_memory_kib < self.hash_parallelism.saturating_mul(8) {
            return Err(anyhow!("auth.hash_memory_kib must be at least 8 * hash_parallelism"));
        }
        Ok(())
    }
}

impl RecoverySettings {
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_CODE_TTL_MINUTES).contains(&self.code_ttl_minutes) {
            return Err(anyhow!("recovery.code_ttl_minutes must be between 1 and {MAX_CODE_TTL_MINUTES}"));
        }
        if self.delivery_timeout_ms == 0 {
            return Err(anyhow!("recovery.delivery_timeout_ms must be a positive number of milliseconds"));
        }
        if let Some(url) = &self.webhook_url {
            let lower = url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("recovery.webhook_url must start with http:// or https://"));
            }
        }
        Ok(())
    }
}
