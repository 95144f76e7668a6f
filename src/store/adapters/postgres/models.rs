//! Diesel row models for the `users` and `tasks` collections.

use crate::store::domain::{
    Collection, FieldMap, FieldValue, Record, task_columns as task, user_columns as user,
};
use chrono::{DateTime, Utc};
use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Integer, Nullable, Text, Timestamptz};

/// Query result row for user records.
#[derive(Debug, Clone, QueryableByName)]
pub struct UserRow {
    /// Surrogate identifier.
    #[diesel(sql_type = Integer)]
    pub id: i32,
    /// Passport series.
    #[diesel(sql_type = Text)]
    pub pasport_series: String,
    /// Passport number.
    #[diesel(sql_type = Text)]
    pub pasport_number: String,
    /// Family name.
    #[diesel(sql_type = Nullable<Text>)]
    pub surname: Option<String>,
    /// Given name.
    #[diesel(sql_type = Nullable<Text>)]
    pub name: Option<String>,
    /// Patronymic.
    #[diesel(sql_type = Nullable<Text>)]
    pub patronymic: Option<String>,
    /// Postal address.
    #[diesel(sql_type = Nullable<Text>)]
    pub address: Option<String>,
}

/// Query result row for task records.
#[derive(Debug, Clone, QueryableByName)]
pub struct TaskRow {
    /// Task identifier.
    #[diesel(sql_type = Integer)]
    pub id: i32,
    /// Task title.
    #[diesel(sql_type = Nullable<Text>)]
    pub title: Option<String>,
    /// Task description.
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    /// Start of the scheduled window.
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub period_from: Option<DateTime<Utc>>,
    /// End of the scheduled window.
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub period_to: Option<DateTime<Utc>>,
    /// Assigned user.
    #[diesel(sql_type = Nullable<Integer>)]
    pub user_id: Option<i32>,
    /// Accumulated cost in nanoseconds.
    #[diesel(sql_type = BigInt)]
    pub cost: i64,
    /// Start of the open work session.
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub work_from: Option<DateTime<Utc>>,
}

/// Identifier returned by `INSERT ... RETURNING id`.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct InsertedId {
    /// Generated identifier.
    #[diesel(sql_type = Integer)]
    pub id: i32,
}

pub(super) fn user_row_to_record(collection: Collection, row: &UserRow) -> Record {
    let fields = FieldMap::new()
        .with(user::ID, row.id)
        .with(user::PASSPORT_SERIES, row.pasport_series.as_str())
        .with(user::PASSPORT_NUMBER, row.pasport_number.as_str())
        .with(user::SURNAME, row.surname.clone())
        .with(user::NAME, row.name.clone())
        .with(user::PATRONYMIC, row.patronymic.clone())
        .with(user::ADDRESS, row.address.clone());
    Record::new(collection, row.id, fields)
}

pub(super) fn task_row_to_record(collection: Collection, row: &TaskRow) -> Record {
    let fields = FieldMap::new()
        .with(task::ID, row.id)
        .with(task::TITLE, row.title.clone())
        .with(task::DESCRIPTION, row.description.clone())
        .with(task::PERIOD_FROM, row.period_from)
        .with(task::PERIOD_TO, row.period_to)
        .with(task::USER_ID, row.user_id)
        .with(task::COST, FieldValue::Int(row.cost))
        .with(task::WORK_FROM, row.work_from);
    Record::new(collection, row.id, fields)
}
