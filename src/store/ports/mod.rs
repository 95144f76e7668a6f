//! Port contracts for generic record storage.
//!
//! Ports define infrastructure-agnostic interfaces used by services.

pub mod record_store;

pub use record_store::{RecordCursor, RecordStore, StoreError, StoreResult};
