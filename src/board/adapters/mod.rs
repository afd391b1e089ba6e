//! Adapter implementations for the board context.

pub mod memory;
pub mod postgres;
