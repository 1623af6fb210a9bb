//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::Path;

/// Ensure the directory that will hold the queue snapshot exists.
pub async fn ensure_env(snapshot_path: &Path) -> anyhow::Result<()> {
    common::env::ensure_env(snapshot_path).await
}
