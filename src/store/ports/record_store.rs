//! Storage port for collection-oriented record persistence.

use crate::store::domain::{Collection, FieldMap, Page, Record};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Forward-only cursor over selected rows.
pub trait RecordCursor: Send {
    /// Moves to the next row. Returns `false` once the rows are exhausted.
    fn advance(&mut self) -> bool;

    /// Reads the row the cursor is positioned on.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRowsFound`] when called before a successful
    /// [`advance`](Self::advance) or after the cursor is exhausted, and
    /// [`StoreError::Persistence`] when the row cannot be decoded.
    fn read(&self) -> StoreResult<Record>;
}

/// Record persistence contract.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Selects rows whose columns equal every entry of `filter`.
    ///
    /// An empty filter selects every row. Rows are returned in ascending
    /// identifier order. Absence of rows is observed through the cursor
    /// never advancing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] for filter columns outside the
    /// collection and [`StoreError::Persistence`] when the query fails.
    async fn select(
        &self,
        collection: Collection,
        filter: &FieldMap,
        page: Page,
    ) -> StoreResult<Box<dyn RecordCursor>>;

    /// Inserts a row and returns its generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] for columns outside the
    /// collection and [`StoreError::Persistence`] when the insert fails.
    async fn insert(&self, collection: Collection, fields: &FieldMap) -> StoreResult<i32>;

    /// Assigns `fields` on every row matching `filter`.
    ///
    /// Returns the number of rows affected, which lets callers detect a
    /// conditional update that lost a race.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] for columns outside the
    /// collection and [`StoreError::Persistence`] when the update fails.
    async fn update(
        &self,
        collection: Collection,
        filter: &FieldMap,
        fields: &FieldMap,
    ) -> StoreResult<u64>;

    /// Deletes the row with the given identifier. Deleting an absent row
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the delete fails.
    async fn delete(&self, collection: Collection, id: i32) -> StoreResult<()>;
}

/// Errors returned by record store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A read was attempted while no row was available.
    #[error("no rows found in {collection}")]
    NoRowsFound {
        /// Collection that was read.
        collection: Collection,
    },

    /// A column name does not belong to the collection.
    #[error("unknown column '{column}' in {collection}")]
    UnknownColumn {
        /// Collection addressed by the operation.
        collection: Collection,
        /// Offending column name.
        column: String,
    },

    /// A write would duplicate the collection's unique key.
    #[error("duplicate key in {collection}")]
    UniqueViolation {
        /// Collection addressed by the operation.
        collection: Collection,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for [`StoreError::UniqueViolation`].
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// Returns `true` for [`StoreError::NoRowsFound`].
    #[must_use]
    pub const fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRowsFound { .. })
    }
}

/// Checks that every column of `fields` belongs to `collection`.
///
/// # Errors
///
/// Returns [`StoreError::UnknownColumn`] for the first foreign column.
pub fn ensure_known_columns(collection: Collection, fields: &FieldMap) -> StoreResult<()> {
    fields
        .columns()
        .find(|column| !collection.has_column(column))
        .map_or(Ok(()), |column| {
            Err(StoreError::UnknownColumn {
                collection,
                column: column.to_owned(),
            })
        })
}
