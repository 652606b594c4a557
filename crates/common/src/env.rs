//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::warn;

/// Ensure the data directory exists; warn when the static page directory is missing.
pub async fn ensure_env(public_dir: &str, data_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(public_dir).await.is_err() {
        warn!(%public_dir, "public assets directory not found; the comments page will 404");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    Ok(())
}
