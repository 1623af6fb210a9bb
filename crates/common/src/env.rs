//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the snapshot's parent directory exists and warn if the snapshot
/// path is occupied by something other than a regular file.
///
/// Problems are only logged: the queue still serves from memory when its
/// snapshot cannot be written.
pub async fn ensure_env(snapshot_path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = snapshot_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %e, "cannot create snapshot directory; queue state will not be persisted");
            return Ok(());
        }
    }
    match tokio::fs::metadata(snapshot_path).await {
        Ok(meta) if !meta.is_file() => {
            warn!(path = %snapshot_path.display(), "snapshot path is not a regular file; persistence will fail");
        }
        Ok(_) => {}
        Err(_) => info!(path = %snapshot_path.display(), "no queue snapshot yet; it will be created on first write"),
    }
    Ok(())
}
