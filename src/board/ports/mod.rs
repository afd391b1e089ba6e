//! Port contracts for the board context.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod changes;
pub mod store;

pub use changes::{ChangeFeed, ChangeKind, TaskChange};
pub use store::{DecodeError, TaskStore, TaskStoreError, TaskStoreResult};
