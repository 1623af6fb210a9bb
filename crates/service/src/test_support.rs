#![cfg(test)]
use std::path::PathBuf;

use uuid::Uuid;

/// Unique snapshot path under the system temp dir; nested so the store has
/// to create the parent directory itself.
pub fn temp_snapshot_path(prefix: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("{}_{}", prefix, Uuid::new_v4()))
        .join("queue_state.json")
}

pub async fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
