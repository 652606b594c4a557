//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate can prepare the
//! storage directory through the service layer that owns it.

/// Ensure the data directory exists; warn when the public directory is missing.
pub async fn ensure_env(public_dir: &str, data_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(public_dir, data_dir).await
}
