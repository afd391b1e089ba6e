//! Boardsync: task ordering and synchronisation engine.
//!
//! This crate provides the core of a workplace-collaboration kanban board:
//! an authoritative client-side task cache over a remote store, a pure
//! column projection, a drag coordinator that turns gestures into status
//! and order changes, and a change-feed subscriber that keeps the cache
//! eventually consistent.
//!
//! # Architecture
//!
//! Boardsync follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`board`]: Task cache, column projection, drag coordination, resync
//! - [`directory`]: Read-mostly view of the external user directory

pub mod board;
pub mod directory;
