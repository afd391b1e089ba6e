//! Task ordering and synchronisation for the kanban board.
//!
//! The board context maintains an authoritative client-side cache of task
//! records over a remote store, derives the four status columns from the
//! flat collection, interprets drag gestures into status and order changes,
//! and keeps the cache eventually consistent by reacting to a server-pushed
//! change feed. The module follows hexagonal architecture:
//!
//! - Domain types and pure derivations in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
