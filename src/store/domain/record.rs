//! Generic row representation.

use super::{Collection, FieldMap, FieldValue};
use chrono::{DateTime, Utc};

/// A row read from a collection.
///
/// Typed accessors return `None` when the column is absent or holds a value
/// of another type; they never coerce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    collection: Collection,
    id: i32,
    fields: FieldMap,
}

impl Record {
    /// Creates a record from its parts.
    #[must_use]
    pub const fn new(collection: Collection, id: i32, fields: FieldMap) -> Self {
        Self {
            collection,
            id,
            fields,
        }
    }

    /// Returns the collection the row was read from.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Returns the row identifier.
    #[must_use]
    pub const fn id(&self) -> i32 {
        self.id
    }

    /// Returns the raw value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Returns a text column.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    /// Returns an integer column.
    #[must_use]
    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(FieldValue::as_int)
    }

    /// Returns a timestamp column.
    #[must_use]
    pub fn timestamp(&self, column: &str) -> Option<DateTime<Utc>> {
        self.get(column).and_then(FieldValue::as_timestamp)
    }
}
