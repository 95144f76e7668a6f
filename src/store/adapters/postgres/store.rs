//! `PostgreSQL` record store backed by an r2d2 connection pool.

use super::{
    models::{InsertedId, TaskRow, UserRow, task_row_to_record, user_row_to_record},
    query::{self, Statement},
};
use crate::store::{
    adapters::BufferedCursor,
    domain::{Collection, FieldMap, FieldValue, Page},
    ports::{RecordCursor, RecordStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Text, Timestamptz};
use tracing::debug;

/// `PostgreSQL` connection pool type used by the record store.
pub type StorePgPool = Pool<ConnectionManager<PgConnection>>;

type BoxedQuery = BoxedSqlQuery<'static, Pg, SqlQuery>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`StoreError::Persistence`] when the pool cannot establish its
/// initial connections.
pub fn build_pool(database_url: &str, max_size: u32) -> StoreResult<StorePgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(StoreError::persistence)
}

/// `PostgreSQL`-backed record store.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: StorePgPool,
}

impl PostgresRecordStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: StorePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

/// Maps a write failure, keeping unique-key conflicts distinguishable.
fn write_error(collection: Collection) -> impl Fn(DieselError) -> StoreError {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreError::UniqueViolation { collection }
        }
        other => StoreError::persistence(other),
    }
}

/// Turns a statement into a diesel query with every parameter bound.
fn prepare(statement: Statement) -> BoxedQuery {
    let Statement { sql, binds } = statement;
    binds
        .into_iter()
        .fold(diesel::sql_query(sql).into_boxed(), |query, value| match value {
            FieldValue::Text(text) => query.bind::<Text, _>(text),
            FieldValue::Int(number) => query.bind::<BigInt, _>(number),
            FieldValue::Timestamp(at) => query.bind::<Timestamptz, _>(at),
            // Builders inline NULL instead of binding it.
            FieldValue::Null => query,
        })
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn select(
        &self,
        collection: Collection,
        filter: &FieldMap,
        page: Page,
    ) -> StoreResult<Box<dyn RecordCursor>> {
        let statement = query::select(collection, filter, page)?;
        debug!(%collection, sql = %statement.sql, "postgres: select");

        self.run_blocking(move |connection| {
            let query = prepare(statement);
            let cursor: Box<dyn RecordCursor> = match collection {
                Collection::Users => {
                    let rows = query
                        .load::<UserRow>(connection)
                        .map_err(StoreError::persistence)?;
                    Box::new(BufferedCursor::new(collection, rows, user_row_to_record))
                }
                Collection::Tasks => {
                    let rows = query
                        .load::<TaskRow>(connection)
                        .map_err(StoreError::persistence)?;
                    Box::new(BufferedCursor::new(collection, rows, task_row_to_record))
                }
            };
            Ok(cursor)
        })
        .await
    }

    async fn insert(&self, collection: Collection, fields: &FieldMap) -> StoreResult<i32> {
        let statement = query::insert(collection, fields)?;
        debug!(%collection, sql = %statement.sql, "postgres: insert");

        self.run_blocking(move |connection| {
            let inserted = prepare(statement)
                .get_result::<InsertedId>(connection)
                .map_err(write_error(collection))?;
            Ok(inserted.id)
        })
        .await
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &FieldMap,
        fields: &FieldMap,
    ) -> StoreResult<u64> {
        let Some(statement) = query::update(collection, filter, fields)? else {
            debug!(%collection, "postgres: update skipped, nothing to assign");
            return Ok(0);
        };
        debug!(%collection, sql = %statement.sql, "postgres: update");

        self.run_blocking(move |connection| {
            let affected = prepare(statement)
                .execute(connection)
                .map_err(write_error(collection))?;
            u64::try_from(affected).map_err(StoreError::persistence)
        })
        .await
    }

    async fn delete(&self, collection: Collection, id: i32) -> StoreResult<()> {
        let statement = query::delete(collection, id);
        debug!(%collection, id, "postgres: delete");

        self.run_blocking(move |connection| {
            prepare(statement)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }
}
