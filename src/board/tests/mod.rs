//! Unit tests for the board context.
//!
//! Tests are organised by component: domain types, pure projections and
//! ordering, the repository cache, drag coordination, and the
//! synchronisation loop.

mod domain_tests;
mod projection_tests;
mod rate_limit_tests;
mod repository_tests;
mod support;
