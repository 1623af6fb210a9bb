use std::{collections::VecDeque, path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::domain::{sort_for_snapshot, validate_payload, EnqueueOutcome, QueueItem, QueueStatus};
use super::QueueService;
use crate::errors::ServiceError;
use crate::storage::{JsonSnapshotFile, SnapshotLoad};

struct QueueState {
    items: VecDeque<QueueItem>,
    last_enqueued_at: Option<DateTime<Utc>>,
    /// Bumped on every mutation; lets queued writers skip work already on disk.
    version: u64,
}

impl QueueState {
    /// Never hand out a timestamp older than the previous one, so snapshot
    /// order matches insertion order even if the wall clock steps back.
    fn next_timestamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ts = match self.last_enqueued_at {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last_enqueued_at = Some(ts);
        ts
    }
}

/// In-memory FIFO queue mirrored to a JSON snapshot file.
///
/// Cloning is cheap and every clone shares the same queue and snapshot.
/// Mutations are applied to memory first and then persisted before the call
/// returns. Only one snapshot write runs at a time; a failed write is logged
/// and the in-memory state stays authoritative.
#[derive(Clone)]
pub struct PersistentQueueStore {
    state: Arc<Mutex<QueueState>>,
    snapshot: Arc<JsonSnapshotFile<QueueItem>>,
    /// Guards the temp-write-rename sequence; holds the last version on disk.
    write_lock: Arc<Mutex<u64>>,
}

impl PersistentQueueStore {
    /// Open the store at `path`, rehydrating from an existing snapshot.
    ///
    /// A missing, empty or unreadable snapshot yields an empty queue; this
    /// never fails.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Self {
        let snapshot = JsonSnapshotFile::<QueueItem>::new(path);
        let path = snapshot.path().display().to_string();

        let items = match snapshot.load().await {
            Ok(SnapshotLoad::Missing) => {
                info!(%path, "queue snapshot not found; starting with empty queue");
                Vec::new()
            }
            Ok(SnapshotLoad::Empty) => {
                warn!(%path, "queue snapshot is empty; starting with empty queue");
                Vec::new()
            }
            Ok(SnapshotLoad::Loaded(mut items)) => {
                sort_for_snapshot(&mut items);
                info!(%path, count = items.len(), "loaded queue items from snapshot");
                items
            }
            Err(e) => {
                error!(%path, error = %e, "failed to load queue snapshot; starting with empty queue");
                Vec::new()
            }
        };

        let last_enqueued_at = items.iter().map(|i| i.enqueued_at).max();
        let state = QueueState { items: items.into(), last_enqueued_at, version: 0 };

        Self {
            state: Arc::new(Mutex::new(state)),
            snapshot: Arc::new(snapshot),
            write_lock: Arc::new(Mutex::new(0)),
        }
    }

    pub fn path(&self) -> &Path {
        self.snapshot.path()
    }

    /// Append `payload` to the tail and persist.
    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn enqueue(&self, payload: String) -> Result<EnqueueOutcome, ServiceError> {
        validate_payload(&payload)?;

        let (item, position, version) = {
            let mut state = self.state.lock().await;
            let enqueued_at = state.next_timestamp(Utc::now());
            let item = QueueItem::new(payload, enqueued_at);
            state.items.push_back(item.clone());
            state.version += 1;
            (item, state.items.len(), state.version)
        };
        debug!(id = %item.id, position, "item enqueued");

        self.persist_logged("enqueue", version).await;
        Ok(EnqueueOutcome { item, position })
    }

    /// Remove and return the head, or `None` when the queue is empty.
    #[instrument(skip(self))]
    pub async fn dequeue(&self) -> Option<QueueItem> {
        let (item, version) = {
            let mut state = self.state.lock().await;
            let item = state.items.pop_front()?;
            state.version += 1;
            (item, state.version)
        };
        debug!(id = %item.id, "item dequeued");

        self.persist_logged("dequeue", version).await;
        Some(item)
    }

    pub async fn status(&self) -> QueueStatus {
        QueueStatus::from_count(self.state.lock().await.items.len())
    }

    /// Persist the current state regardless of what is already on disk.
    pub async fn flush(&self) -> Result<(), ServiceError> {
        self.persist(None).await
    }

    async fn persist_logged(&self, op: &'static str, version: u64) {
        if let Err(e) = self.persist(Some(version)).await {
            error!(op, path = %self.path().display(), error = %e, "failed to persist queue state");
        }
    }

    /// Run the write on its own task so a caller dropping its future cannot
    /// interrupt a half-written temp file.
    async fn persist(&self, version: Option<u64>) -> Result<(), ServiceError> {
        let this = self.clone();
        tokio::spawn(async move { this.write_snapshot(version).await })
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
    }

    async fn write_snapshot(&self, min_version: Option<u64>) -> Result<(), ServiceError> {
        let mut on_disk = self.write_lock.lock().await;
        if let Some(v) = min_version {
            if *on_disk >= v {
                return Ok(());
            }
        }

        // Captured under the write lock so a later writer never stores an older state.
        let (mut items, version) = {
            let state = self.state.lock().await;
            (state.items.iter().cloned().collect::<Vec<_>>(), state.version)
        };
        sort_for_snapshot(&mut items);

        self.snapshot.write(&items).await?;
        *on_disk = version;
        debug!(count = items.len(), version, "queue snapshot written");
        Ok(())
    }
}

#[async_trait]
impl QueueService for PersistentQueueStore {
    async fn enqueue(&self, payload: String) -> Result<EnqueueOutcome, ServiceError> { self.enqueue(payload).await }
    async fn dequeue(&self) -> Option<QueueItem> { self.dequeue().await }
    async fn status(&self) -> QueueStatus { self.status().await }
    async fn flush(&self) -> Result<(), ServiceError> { self.flush().await }
}
