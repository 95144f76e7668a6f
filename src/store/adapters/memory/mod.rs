//! In-memory record store.

mod store;

pub use store::InMemoryRecordStore;
