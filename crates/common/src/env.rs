//! Environment/runtime helpers
//!
//! Sanity checks to ensure the data directory exists at startup.

use tracing::{info, warn};

/// Ensure the data directory exists and warn if the store file is missing.
pub async fn ensure_env(data_dir: &str, store_file: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    let path = std::path::Path::new(data_dir).join(store_file);
    if tokio::fs::metadata(&path).await.is_err() {
        warn!(path = %path.display(), "store file not found; starting with an empty directory");
    } else {
        info!(path = %path.display(), "using existing store file");
    }
    Ok(())
}
