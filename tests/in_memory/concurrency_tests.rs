//! In-memory integration tests for racing transitions on one task.

use std::sync::Arc;

use super::helpers::{Harness, NUMBER, SERIES, SteppedService, at_hour, harness, seed_task};
use chrono::TimeDelta;
use eyre::{Result, ensure};
use rstest::rstest;
use timetracking::store::domain::{FieldMap, Page, task_columns};
use timetracking::timetracking::{
    domain::TaskId,
    services::{ErrorKind, TimeTrackingResult},
};
use tokio::sync::Barrier;
use tokio::task::JoinSet;

const CONTENDERS: usize = 16;

#[derive(Clone, Copy)]
enum Transition {
    Begin,
    End,
}

/// Runs `CONTENDERS` copies of `transition` on `task` at once and returns
/// their outcomes.
async fn race(
    service: SteppedService,
    task: TaskId,
    transition: Transition,
) -> Vec<TimeTrackingResult<()>> {
    let service = Arc::new(service);
    let barrier = Arc::new(Barrier::new(CONTENDERS));
    let mut contenders = JoinSet::new();
    for _ in 0..CONTENDERS {
        let racer = Arc::clone(&service);
        let gate = Arc::clone(&barrier);
        contenders.spawn(async move {
            gate.wait().await;
            match transition {
                Transition::Begin => racer.begin_task_for_user(SERIES, NUMBER, task).await,
                Transition::End => racer.end_task_for_user(SERIES, NUMBER, task).await,
            }
        });
    }
    contenders.join_all().await
}

fn tally(outcomes: &[TimeTrackingResult<()>]) -> (usize, usize) {
    let wins = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let rejected = outcomes
        .iter()
        .filter(|outcome| {
            outcome
                .as_ref()
                .is_err_and(|err| err.kind() == ErrorKind::BusinessRule)
        })
        .count();
    (wins, rejected)
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_begins_admit_exactly_one(harness: Harness) -> Result<()> {
    harness.service.create_user(SERIES, NUMBER).await?;
    let task = seed_task(&harness.store, at_hour(8), at_hour(18), None, 0).await?;

    let outcomes = race(harness.service.clone(), task, Transition::Begin).await;
    let (wins, rejected) = tally(&outcomes);

    ensure!(wins == 1, "expected one winner, got {wins}");
    ensure!(
        rejected == CONTENDERS - 1,
        "losers must see a rule violation, got {rejected}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ends_bill_the_session_once(harness: Harness) -> Result<()> {
    harness.service.create_user(SERIES, NUMBER).await?;
    let task = seed_task(&harness.store, at_hour(8), at_hour(18), None, 0).await?;
    harness.service.begin_task_for_user(SERIES, NUMBER, task).await?;
    harness.clock.advance(TimeDelta::seconds(5));

    let outcomes = race(harness.service.clone(), task, Transition::End).await;
    let (wins, rejected) = tally(&outcomes);
    ensure!(wins == 1, "expected one winner, got {wins}");
    ensure!(rejected == CONTENDERS - 1, "got {rejected} rejections");

    let tasks = harness
        .service
        .find_tasks_by_filter(&FieldMap::new().with(task_columns::ID, task), Page::first())
        .await?;
    let cost = tasks
        .first()
        .map(|found| found.cost())
        .ok_or_else(|| eyre::eyre!("task disappeared"))?;
    ensure!(cost == TimeDelta::seconds(5), "session billed {cost}");
    Ok(())
}
