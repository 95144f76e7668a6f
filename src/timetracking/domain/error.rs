//! Error types for time-tracking domain rules.

use super::TaskId;
use thiserror::Error;

/// Errors returned while validating input or applying task transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackingDomainError {
    /// The passport series is empty.
    #[error("passport series must not be empty")]
    EmptyPassportSeries,

    /// The passport number is empty.
    #[error("passport number must not be empty")]
    EmptyPassportNumber,

    /// A work session is already open on the task.
    #[error("task {0} already started")]
    TaskAlreadyStarted(TaskId),

    /// No work session is open on the task.
    #[error("task {0} not started")]
    TaskNotStarted(TaskId),
}

impl TrackingDomainError {
    /// Returns `true` for malformed identifying input, as opposed to a
    /// violated task transition.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyPassportSeries | Self::EmptyPassportNumber)
    }
}
