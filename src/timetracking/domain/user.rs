//! User entity and its mapping from store records.

use super::UserId;
use crate::store::domain::{Record, user_columns as column};
use serde::Serialize;

/// A person whose work time is tracked.
///
/// Serialises the descriptive attributes only; the surrogate id and the
/// passport pair stay out of response bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip)]
    id: UserId,
    #[serde(skip)]
    passport_series: String,
    #[serde(skip)]
    passport_number: String,
    surname: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    patronymic: Option<String>,
    address: String,
}

impl User {
    /// Maps a `users` record into a user.
    ///
    /// Absent or mistyped columns take their zero value; an empty
    /// patronymic is treated as absent.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let text = |name: &str| record.text(name).unwrap_or_default().to_owned();
        Self {
            id: UserId::new(record.id()),
            passport_series: text(column::PASSPORT_SERIES),
            passport_number: text(column::PASSPORT_NUMBER),
            surname: text(column::SURNAME),
            name: text(column::NAME),
            patronymic: record
                .text(column::PATRONYMIC)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
            address: text(column::ADDRESS),
        }
    }

    /// Returns the surrogate identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the passport series.
    #[must_use]
    pub fn passport_series(&self) -> &str {
        &self.passport_series
    }

    /// Returns the passport number.
    #[must_use]
    pub fn passport_number(&self) -> &str {
        &self.passport_number
    }

    /// Returns the family name.
    #[must_use]
    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// Returns the given name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the patronymic, if any.
    #[must_use]
    pub fn patronymic(&self) -> Option<&str> {
        self.patronymic.as_deref()
    }

    /// Returns the postal address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}
