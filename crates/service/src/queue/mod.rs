//! Persistent FIFO queue.
//!
//! `PersistentQueueStore` keeps the authoritative queue in memory and mirrors
//! it to a JSON snapshot after every mutation. The facade talks to it through
//! the `QueueService` trait.

pub mod domain;
pub mod store;

use async_trait::async_trait;

use crate::errors::ServiceError;
pub use domain::{EnqueueOutcome, QueueItem, QueueStatus};
pub use store::PersistentQueueStore;

/// Trait abstraction for queue operations.
/// Only validation failures surface from `enqueue`; persistence faults are
/// contained by the implementation.
#[async_trait]
pub trait QueueService: Send + Sync {
    async fn enqueue(&self, payload: String) -> Result<EnqueueOutcome, ServiceError>;
    async fn dequeue(&self) -> Option<QueueItem>;
    async fn status(&self) -> QueueStatus;
    /// Write the current state to disk, reporting any failure.
    async fn flush(&self) -> Result<(), ServiceError>;
}
