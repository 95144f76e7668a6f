//! Application services for time tracking.

mod tracking;

pub use tracking::{ErrorKind, TimeTrackingError, TimeTrackingResult, TimeTrackingService};
