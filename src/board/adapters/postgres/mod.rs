//! `PostgreSQL` adapters for board persistence and change notification.

mod decode;
mod feed;
mod models;
mod schema;
mod store;

pub use feed::PostgresChangeFeed;
pub use store::{BoardPgPool, PostgresTaskStore};
