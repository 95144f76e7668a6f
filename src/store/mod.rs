//! Generic record storage for time tracking.
//!
//! The store exposes collection-oriented CRUD over untyped rows. Callers
//! filter with equality maps, page through results and read rows lazily
//! through a forward-only cursor. The module follows hexagonal architecture:
//!
//! - Record, value and collection types in [`domain`]
//! - The storage contract in [`ports`]
//! - In-memory and `PostgreSQL` implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
