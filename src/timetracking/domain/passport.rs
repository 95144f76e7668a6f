//! Passport pair used as the user's natural key.

use super::TrackingDomainError;
use crate::store::domain::{FieldMap, user_columns};
use std::fmt;

/// Validated (series, number) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Passport {
    series: String,
    number: String,
}

impl Passport {
    /// Creates a passport pair.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::EmptyPassportSeries`] or
    /// [`TrackingDomainError::EmptyPassportNumber`] when either part is
    /// empty.
    pub fn new(
        series: impl Into<String>,
        number: impl Into<String>,
    ) -> Result<Self, TrackingDomainError> {
        let series_value = series.into();
        let number_value = number.into();
        if series_value.is_empty() {
            return Err(TrackingDomainError::EmptyPassportSeries);
        }
        if number_value.is_empty() {
            return Err(TrackingDomainError::EmptyPassportNumber);
        }
        Ok(Self {
            series: series_value,
            number: number_value,
        })
    }

    /// Returns the series.
    #[must_use]
    pub fn series(&self) -> &str {
        &self.series
    }

    /// Returns the number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Equality filter selecting the user with this passport.
    #[must_use]
    pub fn to_filter(&self) -> FieldMap {
        FieldMap::new()
            .with(user_columns::PASSPORT_SERIES, self.series.as_str())
            .with(user_columns::PASSPORT_NUMBER, self.number.as_str())
    }
}

impl fmt::Display for Passport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.series, self.number)
    }
}
