//! In-memory integration tests for user registration and maintenance.

use super::helpers::{Harness, NUMBER, SERIES, at_hour, harness, seed_task};
use eyre::{Result, ensure};
use rstest::rstest;
use timetracking::store::domain::{FieldMap, Page, task_columns, user_columns};
use timetracking::timetracking::services::ErrorKind;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_user_is_idempotent(harness: Harness) -> Result<()> {
    let first = harness.service.create_user(SERIES, NUMBER).await?;
    let second = harness.service.create_user(SERIES, NUMBER).await?;
    let other = harness.service.create_user(SERIES, "654321").await?;

    ensure!(first == second, "same passport must map to one user");
    ensure!(first != other, "distinct passports get distinct users");

    let users = harness
        .service
        .find_users_by_filter(&FieldMap::new(), Page::all())
        .await?;
    ensure!(users.len() == 2, "expected two users, found {}", users.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_info_round_trips_through_lookup(harness: Harness) -> Result<()> {
    let id = harness.service.create_user(SERIES, NUMBER).await?;
    let fields = FieldMap::new()
        .with(user_columns::SURNAME, "Petrova")
        .with(user_columns::NAME, "Anna")
        .with(user_columns::PATRONYMIC, "Sergeevna")
        .with(user_columns::ADDRESS, "Lenina 1");
    harness
        .service
        .update_info_user(SERIES, NUMBER, &fields)
        .await?;

    let user = harness.service.find_user_by_passport(SERIES, NUMBER).await?;
    ensure!(user.id() == id, "lookup must return the created user");
    ensure!(user.surname() == "Petrova", "surname mismatch");
    ensure!(user.name() == "Anna", "name mismatch");
    ensure!(user.patronymic() == Some("Sergeevna"), "patronymic mismatch");
    ensure!(user.address() == "Lenina 1", "address mismatch");
    ensure!(user.passport_series() == SERIES, "passport must be untouched");

    let cleared = FieldMap::new().with(user_columns::PATRONYMIC, "");
    harness
        .service
        .update_info_user(SERIES, NUMBER, &cleared)
        .await?;
    let updated = harness.service.find_user_by_passport(SERIES, NUMBER).await?;
    ensure!(updated.patronymic().is_none(), "empty patronymic reads as absent");
    ensure!(updated.name() == "Anna", "partial update keeps other columns");
    Ok(())
}

#[rstest]
#[case("", NUMBER, ErrorKind::Invalid)]
#[case(SERIES, "", ErrorKind::Invalid)]
#[case(SERIES, "000000", ErrorKind::NotFound)]
#[tokio::test(flavor = "multi_thread")]
async fn lookups_classify_missing_users(
    harness: Harness,
    #[case] series: &str,
    #[case] number: &str,
    #[case] expected: ErrorKind,
) -> Result<()> {
    harness.service.create_user(SERIES, NUMBER).await?;

    let lookup = harness.service.find_user_by_passport(series, number).await;
    let delete = harness.service.delete_user(series, number).await;
    let update = harness
        .service
        .update_info_user(series, number, &FieldMap::new())
        .await;

    ensure!(
        lookup.as_ref().err().map(|err| err.kind()) == Some(expected),
        "lookup: {lookup:?}"
    );
    ensure!(
        delete.as_ref().err().map(|err| err.kind()) == Some(expected),
        "delete: {delete:?}"
    );
    ensure!(
        update.as_ref().err().map(|err| err.kind()) == Some(expected),
        "update: {update:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_user_keeps_their_tasks(harness: Harness) -> Result<()> {
    let id = harness.service.create_user(SERIES, NUMBER).await?;
    let task = seed_task(&harness.store, at_hour(8), at_hour(18), Some(id), 60).await?;

    harness.service.delete_user(SERIES, NUMBER).await?;

    let missing = harness.service.find_user_by_passport(SERIES, NUMBER).await;
    ensure!(
        missing.is_err_and(|err| err.kind() == ErrorKind::NotFound),
        "deleted user must not be found"
    );

    let tasks = harness
        .service
        .find_tasks_by_filter(&FieldMap::new().with(task_columns::USER_ID, id), Page::all())
        .await?;
    let kept = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("task must survive user deletion"))?;
    ensure!(kept.id() == task, "unexpected task {}", kept.id());
    ensure!(kept.user_id() == Some(id), "task keeps the stale user reference");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_users_pages_in_id_order(harness: Harness) -> Result<()> {
    for number in ["000001", "000002", "000003", "000004"] {
        harness.service.create_user(SERIES, number).await?;
    }

    let page = harness
        .service
        .find_users_by_filter(&FieldMap::new(), Page::new(2, 1))
        .await?;
    let ids: Vec<i32> = page.iter().map(|user| user.id().value()).collect();
    ensure!(ids == vec![2, 3], "unexpected page {ids:?}");

    let empty = harness
        .service
        .find_users_by_filter(
            &FieldMap::new().with(user_columns::SURNAME, "Nobody"),
            Page::all(),
        )
        .await?;
    ensure!(empty.is_empty(), "non-matching filter yields an empty list");
    Ok(())
}
