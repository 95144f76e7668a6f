//! `PostgreSQL` integration tests for user registration.

use super::helpers::{NUMBER, SERIES, TestDatabase, shared_test_cluster, test_runtime};
use eyre::{Result, ensure};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::rstest;
use timetracking::store::{
    domain::{Collection, FieldMap, Page, user_columns},
    ports::{RecordStore, StoreError},
};

#[rstest]
fn create_user_returns_the_stored_id_on_repeat(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let db = TestDatabase::create(shared_test_cluster, "create_or_get")?;
    test_runtime()?.block_on(async {
        let first = db.service.create_user(SERIES, NUMBER).await?;
        let second = db.service.create_user(SERIES, NUMBER).await?;
        let other = db.service.create_user(SERIES, "654321").await?;

        ensure!(first == second, "same passport must map to one user");
        ensure!(first != other, "distinct passports get distinct users");

        let user = db.service.find_user_by_passport(SERIES, NUMBER).await?;
        ensure!(user.id() == first, "lookup must return the created user");
        ensure!(user.passport_number() == NUMBER, "passport must round-trip");

        let users = db
            .service
            .find_users_by_filter(&FieldMap::new(), Page::all())
            .await?;
        ensure!(users.len() == 2, "expected two users, found {}", users.len());
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn duplicate_passport_insert_is_a_unique_violation(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let db = TestDatabase::create(shared_test_cluster, "unique_passport")?;
    test_runtime()?.block_on(async {
        let passport = FieldMap::new()
            .with(user_columns::PASSPORT_SERIES, SERIES)
            .with(user_columns::PASSPORT_NUMBER, NUMBER);
        db.store.insert(Collection::Users, &passport).await?;

        let duplicate = db.store.insert(Collection::Users, &passport).await;
        ensure!(
            duplicate.as_ref().is_err_and(StoreError::is_unique_violation),
            "second insert must hit the passport index: {duplicate:?}"
        );
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn update_info_round_trips_through_lookup(shared_test_cluster: &'static TestCluster) -> Result<()> {
    let db = TestDatabase::create(shared_test_cluster, "update_info")?;
    test_runtime()?.block_on(async {
        db.service.create_user(SERIES, NUMBER).await?;
        let fields = FieldMap::new()
            .with(user_columns::SURNAME, "Petrova")
            .with(user_columns::PATRONYMIC, "Sergeevna");
        db.service.update_info_user(SERIES, NUMBER, &fields).await?;

        let user = db.service.find_user_by_passport(SERIES, NUMBER).await?;
        ensure!(user.surname() == "Petrova", "surname mismatch");
        ensure!(user.patronymic() == Some("Sergeevna"), "patronymic mismatch");
        ensure!(user.address().is_empty(), "unset columns read back empty");
        Ok::<_, eyre::Report>(())
    })
}
