//! Storage abstractions for service layer
//!
//! Contains the file-backed snapshot used to mirror in-memory state to disk
//! as a single JSON document.

pub mod json_snapshot_file;

pub use json_snapshot_file::{JsonSnapshotFile, SnapshotLoad};
