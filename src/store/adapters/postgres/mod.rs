//! `PostgreSQL` adapter for generic record storage.

mod models;
pub mod query;
mod store;

pub use models::{InsertedId, TaskRow, UserRow};
pub use store::{PostgresRecordStore, StorePgPool, build_pool};
