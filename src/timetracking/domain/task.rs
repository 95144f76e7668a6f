//! Task entity, work-session state and record mapping.

use super::{TaskId, TrackingDomainError, UserId};
use crate::store::domain::{Record, task_columns as column};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

/// Work-session state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    /// No session is open.
    Idle,
    /// A session has been open since the given instant.
    Active {
        /// Session start.
        since: DateTime<Utc>,
    },
}

/// A pre-existing unit of work that accrues cost while a session is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip)]
    id: TaskId,
    title: String,
    description: String,
    period_from: DateTime<Utc>,
    period_to: DateTime<Utc>,
    user_id: Option<UserId>,
    #[serde(serialize_with = "serialize_nanos")]
    cost: TimeDelta,
    #[serde(rename = "WorkFrom")]
    work_from: Option<DateTime<Utc>>,
}

fn serialize_nanos<S: Serializer>(cost: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(nanos(*cost))
}

/// Whole nanoseconds of `cost`, saturating on overflow.
fn nanos(cost: TimeDelta) -> i64 {
    cost.num_nanoseconds().unwrap_or(i64::MAX)
}

impl Task {
    /// Maps a `tasks` record into a task.
    ///
    /// Absent or mistyped columns take their zero value: empty text, the
    /// Unix epoch for the scheduled window, a zero cost and no session.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let text = |name: &str| record.text(name).unwrap_or_default().to_owned();
        Self {
            id: TaskId::new(record.id()),
            title: text(column::TITLE),
            description: text(column::DESCRIPTION),
            period_from: record.timestamp(column::PERIOD_FROM).unwrap_or_default(),
            period_to: record.timestamp(column::PERIOD_TO).unwrap_or_default(),
            user_id: record
                .int(column::USER_ID)
                .and_then(|raw| i32::try_from(raw).ok())
                .map(UserId::new),
            cost: TimeDelta::nanoseconds(record.int(column::COST).unwrap_or_default()),
            work_from: record.timestamp(column::WORK_FROM),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the start of the scheduled window.
    #[must_use]
    pub const fn period_from(&self) -> DateTime<Utc> {
        self.period_from
    }

    /// Returns the end of the scheduled window.
    #[must_use]
    pub const fn period_to(&self) -> DateTime<Utc> {
        self.period_to
    }

    /// Returns the user that last opened a session, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the accumulated cost.
    #[must_use]
    pub const fn cost(&self) -> TimeDelta {
        self.cost
    }

    /// Returns the accumulated cost in nanoseconds, as persisted.
    #[must_use]
    pub fn cost_nanos(&self) -> i64 {
        nanos(self.cost)
    }

    /// Returns the start of the open session, if any.
    #[must_use]
    pub const fn work_from(&self) -> Option<DateTime<Utc>> {
        self.work_from
    }

    /// Returns the current work-session state.
    #[must_use]
    pub const fn state(&self) -> WorkState {
        match self.work_from {
            Some(since) => WorkState::Active { since },
            None => WorkState::Idle,
        }
    }

    /// Returns `true` when the scheduled window intersects `[begin, end]`.
    ///
    /// Bounds are inclusive: a window ending exactly at `begin` overlaps.
    #[must_use]
    pub fn overlaps(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !(self.period_to < begin || self.period_from > end)
    }

    /// Checks that a session may be opened.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::TaskAlreadyStarted`] when a session is
    /// already open.
    pub const fn ensure_idle(&self) -> Result<(), TrackingDomainError> {
        match self.state() {
            WorkState::Idle => Ok(()),
            WorkState::Active { .. } => Err(TrackingDomainError::TaskAlreadyStarted(self.id)),
        }
    }

    /// Computes the cost after closing the open session at `now`.
    ///
    /// Returns the session start together with the new accumulated cost.
    /// Elapsed time never goes negative, so cost never decreases even if
    /// `now` precedes the session start.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::TaskNotStarted`] when no session is
    /// open.
    pub fn close_session(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, TimeDelta), TrackingDomainError> {
        let WorkState::Active { since } = self.state() else {
            return Err(TrackingDomainError::TaskNotStarted(self.id));
        };
        let elapsed = now.signed_duration_since(since).max(TimeDelta::zero());
        let cost = self.cost.checked_add(&elapsed).unwrap_or(TimeDelta::MAX);
        Ok((since, cost))
    }
}
