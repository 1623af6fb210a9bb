//! Service layer holding the persistent FIFO queue.
//! - `queue`: domain types, the `QueueService` seam and the file-backed store.
//! - `storage`: reusable atomic JSON snapshot file.
//! - Errors are reported through `errors::ServiceError`.

pub mod errors;
pub mod queue;
pub mod runtime;
pub mod storage;
#[cfg(test)]
pub mod test_support;

pub use queue::{PersistentQueueStore, QueueService};
