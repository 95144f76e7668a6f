//! Domain model for time tracking.
//!
//! Entities are derived from generic store records through tolerant mapping
//! functions; business rules operate on the typed values only.

mod cost;
mod error;
mod ids;
mod passport;
mod task;
mod user;

pub use cost::format_whole_seconds;
pub use error::TrackingDomainError;
pub use ids::{TaskId, UserId};
pub use passport::Passport;
pub use task::{Task, WorkState};
pub use user::User;
