//! External user directory context.
//!
//! The board treats users as read-mostly directory entries owned by an
//! external collaborator service: profiles are looked up, never created or
//! mutated here. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
