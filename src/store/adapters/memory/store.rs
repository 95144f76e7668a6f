//! In-memory record store for tests and local experimentation.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::store::{
    adapters::BufferedCursor,
    domain::{Collection, FieldMap, FieldValue, Page, Record},
    ports::{
        RecordCursor, RecordStore, StoreError, StoreResult, record_store::ensure_known_columns,
    },
};

/// Thread-safe in-memory record store.
///
/// Every operation holds the lock for its whole duration, so conditional
/// updates are atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    tables: HashMap<Collection, Table>,
}

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, FieldMap>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

/// Builds a full row with every collection column, absent ones as null.
fn blank_row(collection: Collection, id: i32) -> FieldMap {
    collection
        .columns()
        .iter()
        .map(|column| (*column, FieldValue::Null))
        .collect::<FieldMap>()
        .with("id", id)
}

fn clone_record(_collection: Collection, record: &Record) -> Record {
    record.clone()
}

/// Returns `true` when `rows` already hold `candidate`'s unique key.
fn duplicates_key<'a>(
    collection: Collection,
    mut rows: impl Iterator<Item = &'a FieldMap>,
    candidate: &FieldMap,
) -> bool {
    let key = collection.unique_key();
    let keyed = key
        .iter()
        .all(|column| candidate.get(column).is_some_and(|value| !value.is_null()));
    keyed
        && !key.is_empty()
        && rows.any(|row| key.iter().all(|column| row.get(column) == candidate.get(column)))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(
        &self,
        collection: Collection,
        filter: &FieldMap,
        page: Page,
    ) -> StoreResult<Box<dyn RecordCursor>> {
        ensure_known_columns(collection, filter)?;
        let state = self.read_state()?;
        let matching = state
            .tables
            .get(&collection)
            .into_iter()
            .flat_map(|table| table.rows.iter())
            .filter(|(_, fields)| fields.matches(filter))
            .skip(page.offset())
            .take(page.limit().unwrap_or(usize::MAX))
            .map(|(id, fields)| Record::new(collection, *id, fields.clone()))
            .collect::<Vec<_>>();

        debug!(%collection, rows = matching.len(), "memory: select");
        Ok(Box::new(BufferedCursor::new(
            collection,
            matching,
            clone_record,
        )))
    }

    async fn insert(&self, collection: Collection, fields: &FieldMap) -> StoreResult<i32> {
        ensure_known_columns(collection, fields)?;
        let mut state = self.write_state()?;
        let table = state.tables.entry(collection).or_default();
        if duplicates_key(collection, table.rows.values(), fields) {
            debug!(%collection, "memory: insert rejected, duplicate key");
            return Err(StoreError::UniqueViolation { collection });
        }
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::persistence(std::io::Error::other("identifier overflow")))?;
        table.last_id = id;

        let mut row = blank_row(collection, id);
        for (column, value) in fields.iter().filter(|(column, _)| *column != "id") {
            row.insert(column.as_str(), value.clone());
        }
        table.rows.insert(id, row);

        debug!(%collection, id, "memory: insert");
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &FieldMap,
        fields: &FieldMap,
    ) -> StoreResult<u64> {
        ensure_known_columns(collection, filter)?;
        ensure_known_columns(collection, fields)?;
        if fields.is_empty() {
            return Ok(0);
        }
        let mut state = self.write_state()?;
        let Some(table) = state.tables.get_mut(&collection) else {
            return Ok(0);
        };

        let mut affected = 0_u64;
        for row in table.rows.values_mut().filter(|row| row.matches(filter)) {
            for (column, value) in fields.iter().filter(|(column, _)| *column != "id") {
                row.insert(column.as_str(), value.clone());
            }
            affected = affected.saturating_add(1);
        }

        debug!(%collection, affected, "memory: update");
        Ok(affected)
    }

    async fn delete(&self, collection: Collection, id: i32) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let removed = state
            .tables
            .get_mut(&collection)
            .and_then(|table| table.rows.remove(&id))
            .is_some();

        debug!(%collection, id, removed, "memory: delete");
        Ok(())
    }
}
