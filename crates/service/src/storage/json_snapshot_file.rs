use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt};

use crate::errors::ServiceError;

/// Result of reading a snapshot from disk.
#[derive(Debug, PartialEq)]
pub enum SnapshotLoad<T> {
    /// No file at the configured path.
    Missing,
    /// File exists but holds only whitespace.
    Empty,
    Loaded(Vec<T>),
}

/// JSON file holding a full list of records, replaced atomically on every write.
///
/// Writes go to a sibling `*.tmp` file which is fsynced and then renamed over
/// the destination, so readers only ever see a complete document. Callers
/// are responsible for serializing concurrent writes.
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile<T> {
    file_path: PathBuf,
    tmp_path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSnapshotFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let file_path = path.into();
        let mut tmp_name = file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        tmp_name.push(".tmp");
        let tmp_path = file_path.with_file_name(tmp_name);
        Self { file_path, tmp_path, _marker: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and decode the snapshot.
    pub async fn load(&self) -> Result<SnapshotLoad<T>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SnapshotLoad::Missing),
            Err(e) => return Err(ServiceError::persistence("read", &self.file_path, e)),
        };
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(SnapshotLoad::Empty);
        }
        let items: Vec<T> = serde_json::from_slice(&bytes)?;
        Ok(SnapshotLoad::Loaded(items))
    }

    /// Replace the snapshot with `items`.
    pub async fn write(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(items)?;
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::persistence("create_dir", parent, e))?;
        }

        let mut file = fs::File::create(&self.tmp_path)
            .await
            .map_err(|e| ServiceError::persistence("create", &self.tmp_path, e))?;
        file.write_all(&data)
            .await
            .map_err(|e| ServiceError::persistence("write", &self.tmp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| ServiceError::persistence("fsync", &self.tmp_path, e))?;
        drop(file);

        if let Err(e) = fs::rename(&self.tmp_path, &self.file_path).await {
            let _ = fs::remove_file(&self.tmp_path).await;
            return Err(ServiceError::persistence("rename", &self.file_path, e));
        }
        Ok(())
    }
}
