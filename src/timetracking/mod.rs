//! Time accounting for users working on pre-existing tasks.
//!
//! Users are identified by their passport pair. A task is either idle or
//! has one open work session; closing the session adds its elapsed time to
//! the task's cost. Costs can be reported per user over a date range. The
//! module follows hexagonal architecture:
//!
//! - Domain types and entity mapping in [`domain`]
//! - Orchestration over the record store in [`services`]

pub mod domain;
pub mod services;
