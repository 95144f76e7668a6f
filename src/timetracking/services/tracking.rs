//! Service layer for user lookup, work sessions and cost reports.

use crate::store::{
    domain::{Collection, FieldMap, FieldValue, Page, Record, task_columns, user_columns},
    ports::{RecordStore, StoreError},
};
use crate::timetracking::domain::{
    Passport, Task, TaskId, TrackingDomainError, User, UserId, format_whole_seconds,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Span, debug, info, instrument, warn};

/// Coarse classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Identifying input was empty or malformed.
    Invalid,
    /// The user or task does not exist.
    NotFound,
    /// The underlying store failed.
    Storage,
    /// A task transition was not allowed in the current state.
    BusinessRule,
}

impl ErrorKind {
    /// Returns `true` when the caller caused the failure.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Storage)
    }
}

/// Service-level errors for time-tracking operations.
#[derive(Debug, Error)]
pub enum TimeTrackingError {
    /// Input validation or a task transition rule failed.
    #[error(transparent)]
    Domain(#[from] TrackingDomainError),

    /// No user has the given passport.
    #[error("user not found: {0}")]
    UserNotFound(Passport),

    /// No task has the given identifier.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A store operation failed.
    #[error("{operation} failed: {source}")]
    Storage {
        /// Name of the service operation.
        operation: &'static str,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
}

impl TimeTrackingError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) if err.is_invalid_input() => ErrorKind::Invalid,
            Self::Domain(_) => ErrorKind::BusinessRule,
            Self::UserNotFound(_) | Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }
}

/// Result type for time-tracking service operations.
pub type TimeTrackingResult<T> = Result<T, TimeTrackingError>;

/// Wraps a store error with the failing operation and logs it.
fn storage(operation: &'static str) -> impl FnOnce(StoreError) -> TimeTrackingError {
    move |source| {
        warn!(operation, error = %source, "store operation failed");
        TimeTrackingError::Storage { operation, source }
    }
}

/// Time-tracking orchestration service.
///
/// Holds no per-call state: clones share the store and clock, and every
/// operation span is a child of the span given at construction.
pub struct TimeTrackingService<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    span: Span,
}

impl<S, C> Clone for TimeTrackingService<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            span: self.span.clone(),
        }
    }
}

impl<S, C> TimeTrackingService<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    /// Creates a new time-tracking service logging under `span`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, span: Span) -> Self {
        Self { store, clock, span }
    }

    /// Finds the user with the given passport pair.
    ///
    /// # Errors
    ///
    /// Returns a [`TimeTrackingError::Domain`] error for an empty series or
    /// number, [`TimeTrackingError::UserNotFound`] when no user matches and
    /// [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn find_user_by_passport(
        &self,
        series: &str,
        number: &str,
    ) -> TimeTrackingResult<User> {
        let passport = Passport::new(series, number)?;
        self.resolve_user(passport).await
    }

    /// Finds users matching `filter`. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn find_users_by_filter(
        &self,
        filter: &FieldMap,
        page: Page,
    ) -> TimeTrackingResult<Vec<User>> {
        self.select_mapped(
            "find_users_by_filter",
            Collection::Users,
            filter,
            page,
            User::from_record,
        )
        .await
    }

    /// Finds tasks matching `filter`. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn find_tasks_by_filter(
        &self,
        filter: &FieldMap,
        page: Page,
    ) -> TimeTrackingResult<Vec<Task>> {
        self.select_mapped(
            "find_tasks_by_filter",
            Collection::Tasks,
            filter,
            page,
            Task::from_record,
        )
        .await
    }

    /// Reports the cost of every task of the user whose scheduled window
    /// overlaps `[begin, end]`.
    ///
    /// Lines have the form `<task id>-<cost>` with the cost truncated to
    /// whole seconds. They are sorted by the formatted cost text in
    /// descending lexical order, so `9s` sorts before `1h0m0s`.
    ///
    /// # Errors
    ///
    /// Propagates user lookup errors and returns
    /// [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn calculate_cost_by_user(
        &self,
        series: &str,
        number: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> TimeTrackingResult<Vec<String>> {
        const OPERATION: &str = "calculate_cost_by_user";

        let user = self.resolve_user(Passport::new(series, number)?).await?;
        let filter = FieldMap::new().with(task_columns::USER_ID, user.id());
        let tasks = self
            .select_mapped(
                OPERATION,
                Collection::Tasks,
                &filter,
                Page::all(),
                Task::from_record,
            )
            .await?;

        let mut costs: Vec<(String, String)> = tasks
            .iter()
            .filter(|task| task.overlaps(begin, end))
            .map(|task| {
                let cost = format_whole_seconds(task.cost());
                let line = format!("{}-{cost}", task.id());
                (cost, line)
            })
            .collect();
        costs.sort_by(|(left, _), (right, _)| right.cmp(left));

        debug!(user_id = %user.id(), lines = costs.len(), "cost calculated");
        Ok(costs.into_iter().map(|(_, line)| line).collect())
    }

    /// Opens a work session on the task for the user.
    ///
    /// The session start and the assigned user are written with a single
    /// update that only matches while the task is idle, so concurrent calls
    /// for the same task cannot both succeed.
    ///
    /// # Errors
    ///
    /// Propagates user lookup errors, returns
    /// [`TimeTrackingError::TaskNotFound`] for an unknown task,
    /// [`TrackingDomainError::TaskAlreadyStarted`] when a session is open and
    /// [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn begin_task_for_user(
        &self,
        series: &str,
        number: &str,
        task_id: TaskId,
    ) -> TimeTrackingResult<()> {
        const OPERATION: &str = "begin_task_for_user";

        let user = self.resolve_user(Passport::new(series, number)?).await?;
        let task = self.find_task(task_id).await?;
        if let Err(err) = task.ensure_idle() {
            info!(error = %err, "task transition rejected");
            return Err(err.into());
        }

        let started_at = self.clock.utc();
        let idle_task = FieldMap::new()
            .with(task_columns::ID, task_id)
            .with(task_columns::WORK_FROM, FieldValue::Null);
        let assignment = FieldMap::new()
            .with(task_columns::WORK_FROM, started_at)
            .with(task_columns::USER_ID, user.id());
        let affected = self
            .store
            .update(Collection::Tasks, &idle_task, &assignment)
            .await
            .map_err(storage(OPERATION))?;
        if affected == 0 {
            info!("task was started concurrently");
            return Err(TrackingDomainError::TaskAlreadyStarted(task_id).into());
        }

        debug!(user_id = %user.id(), %started_at, "task started");
        Ok(())
    }

    /// Closes the open work session on the task and adds its elapsed time
    /// to the task's cost.
    ///
    /// The update only matches while the session read here is still open,
    /// so a session is never closed twice.
    ///
    /// # Errors
    ///
    /// Propagates user lookup errors, returns
    /// [`TimeTrackingError::TaskNotFound`] for an unknown task,
    /// [`TrackingDomainError::TaskNotStarted`] when no session is open and
    /// [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn end_task_for_user(
        &self,
        series: &str,
        number: &str,
        task_id: TaskId,
    ) -> TimeTrackingResult<()> {
        const OPERATION: &str = "end_task_for_user";

        let user = self.resolve_user(Passport::new(series, number)?).await?;
        let task = self.find_task(task_id).await?;
        let (started_at, cost) = match task.close_session(self.clock.utc()) {
            Ok(closed) => closed,
            Err(err) => {
                info!(error = %err, "task transition rejected");
                return Err(err.into());
            }
        };

        let open_session = FieldMap::new()
            .with(task_columns::ID, task_id)
            .with(task_columns::WORK_FROM, started_at);
        let assignment = FieldMap::new()
            .with(task_columns::COST, cost.num_nanoseconds().unwrap_or(i64::MAX))
            .with(task_columns::WORK_FROM, FieldValue::Null);
        let affected = self
            .store
            .update(Collection::Tasks, &open_session, &assignment)
            .await
            .map_err(storage(OPERATION))?;
        if affected == 0 {
            info!("task was ended concurrently");
            return Err(TrackingDomainError::TaskNotStarted(task_id).into());
        }

        debug!(user_id = %user.id(), cost_seconds = cost.num_seconds(), "task ended");
        Ok(())
    }

    /// Deletes the user. Tasks keep their reference to the deleted user.
    ///
    /// # Errors
    ///
    /// Propagates user lookup errors and returns
    /// [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn delete_user(&self, series: &str, number: &str) -> TimeTrackingResult<()> {
        let user = self.resolve_user(Passport::new(series, number)?).await?;
        self.store
            .delete(Collection::Users, user.id().value())
            .await
            .map_err(storage("delete_user"))?;

        debug!(user_id = %user.id(), "user deleted");
        Ok(())
    }

    /// Applies a partial update to the user's descriptive columns.
    ///
    /// Callers are expected to strip passport columns from `fields`.
    ///
    /// # Errors
    ///
    /// Propagates user lookup errors and returns
    /// [`TimeTrackingError::Storage`] when the store fails or rejects a
    /// column.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn update_info_user(
        &self,
        series: &str,
        number: &str,
        fields: &FieldMap,
    ) -> TimeTrackingResult<()> {
        let user = self.resolve_user(Passport::new(series, number)?).await?;
        let filter = FieldMap::new().with(user_columns::ID, user.id());
        self.store
            .update(Collection::Users, &filter, fields)
            .await
            .map_err(storage("update_info_user"))?;

        debug!(user_id = %user.id(), "user updated");
        Ok(())
    }

    /// Returns the id of the user with the passport pair, creating the user
    /// first when none exists. Losing a concurrent create to the same
    /// passport returns the winner's id.
    ///
    /// # Errors
    ///
    /// Returns a [`TimeTrackingError::Domain`] error for an empty series or
    /// number and [`TimeTrackingError::Storage`] when the store fails.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn create_user(&self, series: &str, number: &str) -> TimeTrackingResult<UserId> {
        let passport = Passport::new(series, number)?;
        match self.resolve_user(passport.clone()).await {
            Ok(user) => {
                debug!(user_id = %user.id(), "user already exists");
                return Ok(user.id());
            }
            Err(TimeTrackingError::UserNotFound(_)) => {}
            Err(err) => return Err(err),
        }

        match self
            .store
            .insert(Collection::Users, &passport.to_filter())
            .await
        {
            Ok(id) => {
                debug!(user_id = id, "user created");
                Ok(UserId::new(id))
            }
            Err(err) if err.is_unique_violation() => {
                debug!("user created concurrently");
                self.resolve_user(passport).await.map(|user| user.id())
            }
            Err(err) => Err(storage("create_user")(err)),
        }
    }

    async fn resolve_user(&self, passport: Passport) -> TimeTrackingResult<User> {
        let users = self
            .select_mapped(
                "find_user_by_passport",
                Collection::Users,
                &passport.to_filter(),
                Page::first(),
                User::from_record,
            )
            .await?;
        let user = users.into_iter().next().ok_or_else(|| {
            info!(%passport, "user not found");
            TimeTrackingError::UserNotFound(passport)
        })?;
        debug!(user_id = %user.id(), "user found");
        Ok(user)
    }

    async fn find_task(&self, task_id: TaskId) -> TimeTrackingResult<Task> {
        let filter = FieldMap::new().with(task_columns::ID, task_id);
        let tasks = self
            .select_mapped(
                "find_task",
                Collection::Tasks,
                &filter,
                Page::first(),
                Task::from_record,
            )
            .await?;
        tasks.into_iter().next().ok_or_else(|| {
            info!(%task_id, "task not found");
            TimeTrackingError::TaskNotFound(task_id)
        })
    }

    /// Selects rows and maps each into an entity.
    ///
    /// A backend that reports "no rows" eagerly yields an empty list.
    async fn select_mapped<T>(
        &self,
        operation: &'static str,
        collection: Collection,
        filter: &FieldMap,
        page: Page,
        map: fn(&Record) -> T,
    ) -> TimeTrackingResult<Vec<T>> {
        let mut cursor = match self.store.select(collection, filter, page).await {
            Ok(cursor) => cursor,
            Err(err) if err.is_no_rows() => return Ok(Vec::new()),
            Err(err) => return Err(storage(operation)(err)),
        };

        let mut entities = Vec::new();
        while cursor.advance() {
            let record = cursor.read().map_err(storage(operation))?;
            entities.push(map(&record));
        }

        debug!(operation, %collection, count = entities.len(), "records mapped");
        Ok(entities)
    }
}
