//! Error types for directory domain parsing.

use thiserror::Error;

/// Error returned while parsing presence values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown presence: {0}")]
pub struct ParsePresenceError(pub String);
