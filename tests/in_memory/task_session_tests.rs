//! In-memory integration tests for work-session transitions.

use std::sync::Arc;

use super::helpers::{Harness, NUMBER, SERIES, at_hour, harness, seed_task};
use chrono::TimeDelta;
use eyre::{Result, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use timetracking::store::{
    adapters::memory::InMemoryRecordStore,
    domain::{FieldMap, Page, task_columns},
};
use timetracking::timetracking::{
    domain::{Task, TaskId, TrackingDomainError, WorkState},
    services::{ErrorKind, TimeTrackingError, TimeTrackingService, TimeTrackingResult},
};
use tracing::Span;

async fn load_task(harness: &Harness, id: TaskId) -> TimeTrackingResult<Option<Task>> {
    let tasks = harness
        .service
        .find_tasks_by_filter(&FieldMap::new().with(task_columns::ID, id), Page::first())
        .await?;
    Ok(tasks.into_iter().next())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sessions_accumulate_cost(harness: Harness) -> Result<()> {
    let user = harness.service.create_user(SERIES, NUMBER).await?;
    let task = seed_task(&harness.store, at_hour(8), at_hour(18), None, 0).await?;

    harness.service.begin_task_for_user(SERIES, NUMBER, task).await?;
    let active = load_task(&harness, task)
        .await?
        .ok_or_else(|| eyre::eyre!("task disappeared"))?;
    ensure!(
        active.state() == WorkState::Active { since: at_hour(9) },
        "session starts at the clock's current time"
    );
    ensure!(active.user_id() == Some(user), "begin assigns the user");

    harness.clock.advance(TimeDelta::seconds(90));
    harness.service.end_task_for_user(SERIES, NUMBER, task).await?;

    harness.clock.advance(TimeDelta::minutes(10));
    harness.service.begin_task_for_user(SERIES, NUMBER, task).await?;
    harness.clock.advance(TimeDelta::seconds(30));
    harness.service.end_task_for_user(SERIES, NUMBER, task).await?;

    let idle = load_task(&harness, task)
        .await?
        .ok_or_else(|| eyre::eyre!("task disappeared"))?;
    ensure!(idle.state() == WorkState::Idle, "end closes the session");
    ensure!(
        idle.cost() == TimeDelta::seconds(120),
        "idle time between sessions is not billed, got {}",
        idle.cost()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_transitions_are_rejected(harness: Harness) -> Result<()> {
    harness.service.create_user(SERIES, NUMBER).await?;
    let task = seed_task(&harness.store, at_hour(8), at_hour(18), None, 0).await?;

    let early_end = harness.service.end_task_for_user(SERIES, NUMBER, task).await;
    ensure!(
        matches!(
            early_end,
            Err(TimeTrackingError::Domain(TrackingDomainError::TaskNotStarted(id))) if id == task
        ),
        "ending an idle task must fail: {early_end:?}"
    );

    harness.service.begin_task_for_user(SERIES, NUMBER, task).await?;
    let second_begin = harness.service.begin_task_for_user(SERIES, NUMBER, task).await;
    ensure!(
        second_begin.is_err_and(|err| err.kind() == ErrorKind::BusinessRule),
        "a running task cannot be started again"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitions_require_known_user_and_task(harness: Harness) -> Result<()> {
    harness.service.create_user(SERIES, NUMBER).await?;
    let task = seed_task(&harness.store, at_hour(8), at_hour(18), None, 0).await?;

    let stranger = harness
        .service
        .begin_task_for_user(SERIES, "999999", task)
        .await;
    ensure!(
        stranger.is_err_and(|err| err.kind() == ErrorKind::NotFound),
        "unknown passport must be not found"
    );

    let blank = harness.service.end_task_for_user("", NUMBER, task).await;
    ensure!(
        blank.is_err_and(|err| err.kind() == ErrorKind::Invalid),
        "empty series must be invalid"
    );

    let missing = harness
        .service
        .begin_task_for_user(SERIES, NUMBER, TaskId::new(404))
        .await;
    ensure!(
        matches!(missing, Err(TimeTrackingError::TaskNotFound(_))),
        "unknown task must be not found"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wall_clock_session_bills_at_least_the_elapsed_time() -> Result<()> {
    let store = InMemoryRecordStore::new();
    let service = TimeTrackingService::new(
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
        Span::none(),
    );
    service.create_user(SERIES, NUMBER).await?;
    let task = seed_task(&store, at_hour(8), at_hour(18), None, 0).await?;

    service.begin_task_for_user(SERIES, NUMBER, task).await?;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    service.end_task_for_user(SERIES, NUMBER, task).await?;

    let tasks = service
        .find_tasks_by_filter(&FieldMap::new().with(task_columns::ID, task), Page::first())
        .await?;
    let billed = tasks
        .first()
        .map(Task::cost)
        .ok_or_else(|| eyre::eyre!("task disappeared"))?;
    ensure!(
        billed >= TimeDelta::milliseconds(20),
        "billed {billed} is shorter than the session"
    );
    Ok(())
}
