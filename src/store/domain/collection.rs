//! Named collections and their column sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names of the `users` collection.
pub mod user_columns {
    /// Surrogate identifier.
    pub const ID: &str = "id";
    /// Passport series, first half of the natural key.
    pub const PASSPORT_SERIES: &str = "pasport_series";
    /// Passport number, second half of the natural key.
    pub const PASSPORT_NUMBER: &str = "pasport_number";
    /// Family name.
    pub const SURNAME: &str = "surname";
    /// Given name.
    pub const NAME: &str = "name";
    /// Optional patronymic.
    pub const PATRONYMIC: &str = "patronymic";
    /// Postal address.
    pub const ADDRESS: &str = "address";

    pub(crate) const ALL: [&str; 7] = [
        ID,
        PASSPORT_SERIES,
        PASSPORT_NUMBER,
        SURNAME,
        NAME,
        PATRONYMIC,
        ADDRESS,
    ];
}

/// Column names of the `tasks` collection.
pub mod task_columns {
    /// Task identifier.
    pub const ID: &str = "id";
    /// Task title.
    pub const TITLE: &str = "title";
    /// Task description.
    pub const DESCRIPTION: &str = "description";
    /// Start of the scheduled window.
    pub const PERIOD_FROM: &str = "period_from";
    /// End of the scheduled window.
    pub const PERIOD_TO: &str = "period_to";
    /// Identifier of the user that last opened a session.
    pub const USER_ID: &str = "user_id";
    /// Accumulated cost in nanoseconds.
    pub const COST: &str = "cost";
    /// Start of the open work session, null when idle.
    pub const WORK_FROM: &str = "work_from";

    pub(crate) const ALL: [&str; 8] = [
        ID,
        TITLE,
        DESCRIPTION,
        PERIOD_FROM,
        PERIOD_TO,
        USER_ID,
        COST,
        WORK_FROM,
    ];
}

/// A logical collection of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Registered users keyed by passport.
    Users,
    /// Pre-existing tasks that accrue work time.
    Tasks,
}

impl Collection {
    /// Returns the canonical storage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tasks => "tasks",
        }
    }

    /// Returns every column of the collection, identifier first.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Users => &user_columns::ALL,
            Self::Tasks => &task_columns::ALL,
        }
    }

    /// Returns the columns that together must be unique across rows, or an
    /// empty slice when the collection has no natural key.
    #[must_use]
    pub const fn unique_key(self) -> &'static [&'static str] {
        match self {
            Self::Users => &[user_columns::PASSPORT_SERIES, user_columns::PASSPORT_NUMBER],
            Self::Tasks => &[],
        }
    }

    /// Returns `true` when `column` belongs to the collection.
    #[must_use]
    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
