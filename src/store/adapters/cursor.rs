//! Cursor over rows already fetched from a backend.

use crate::store::{
    domain::{Collection, Record},
    ports::{RecordCursor, StoreError, StoreResult},
};

/// Forward-only cursor that decodes each buffered row into a [`Record`]
/// only when it is read.
pub struct BufferedCursor<T> {
    collection: Collection,
    pending: std::vec::IntoIter<T>,
    current: Option<T>,
    decode: fn(Collection, &T) -> Record,
}

impl<T> BufferedCursor<T> {
    /// Creates a cursor over `rows`.
    #[must_use]
    pub fn new(
        collection: Collection,
        rows: Vec<T>,
        decode: fn(Collection, &T) -> Record,
    ) -> Self {
        Self {
            collection,
            pending: rows.into_iter(),
            current: None,
            decode,
        }
    }
}

impl<T: Send> RecordCursor for BufferedCursor<T> {
    fn advance(&mut self) -> bool {
        self.current = self.pending.next();
        self.current.is_some()
    }

    fn read(&self) -> StoreResult<Record> {
        let row = self.current.as_ref().ok_or(StoreError::NoRowsFound {
            collection: self.collection,
        })?;
        Ok((self.decode)(self.collection, row))
    }
}
