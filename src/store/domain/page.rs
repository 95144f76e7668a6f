//! Pagination window for selects.

/// Limit and offset applied to a select.
///
/// A limit of zero means "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    limit: usize,
    offset: usize,
}

impl Page {
    /// Creates a page window.
    #[must_use]
    pub const fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Every row, no offset.
    #[must_use]
    pub const fn all() -> Self {
        Self::new(0, 0)
    }

    /// At most one row, no offset.
    #[must_use]
    pub const fn first() -> Self {
        Self::new(1, 0)
    }

    /// Returns the row limit, `None` when unbounded.
    #[must_use]
    pub const fn limit(self) -> Option<usize> {
        if self.limit == 0 {
            None
        } else {
            Some(self.limit)
        }
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }
}
