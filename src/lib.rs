//! Timetracking: employee time tracking over a generic record store.
//!
//! The crate registers users identified by a passport pair, opens and closes
//! work sessions on tasks, and reports the effort each user spent on tasks
//! scheduled inside a time window.
//!
//! # Architecture
//!
//! Timetracking follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`store`]: Generic record storage over the `users` and `tasks` collections
//! - [`timetracking`]: Users, tasks, work sessions and cost reports
//! - [`config`]: Layered database configuration
//! - [`telemetry`]: Subscriber setup for binaries

pub mod config;
pub mod store;
pub mod telemetry;
pub mod timetracking;
