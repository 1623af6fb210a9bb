use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// A single queued payload. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: Uuid,
    pub payload: String,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueItem {
    pub(crate) fn new(payload: String, enqueued_at: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), payload, enqueued_at }
    }
}

/// Result of an enqueue: the stored item and the queue length right after
/// the append. `position` is approximate under concurrent callers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueOutcome {
    pub item: QueueItem,
    pub position: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub count: usize,
    pub is_empty: bool,
}

impl QueueStatus {
    pub fn from_count(count: usize) -> Self {
        Self { count, is_empty: count == 0 }
    }
}

/// Reject payloads that are empty after trimming surrounding whitespace.
pub fn validate_payload(payload: &str) -> Result<(), ServiceError> {
    if payload.trim().is_empty() {
        return Err(ServiceError::Validation("payload cannot be empty".into()));
    }
    Ok(())
}

/// Stable sort by `enqueued_at`; equal timestamps keep their relative order.
pub fn sort_for_snapshot(items: &mut [QueueItem]) {
    items.sort_by_key(|i| i.enqueued_at);
}
