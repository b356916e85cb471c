//! Half-open UTC time ranges.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};

use crate::ValidationError;

/// A half-open time range `[from, to)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range (inclusive).
    pub from: DateTime<Utc>,
    /// End of the range (exclusive).
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new range, validating that `from < to`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDateRange`] if `from >= to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ValidationError> {
        if from >= to {
            return Err(ValidationError::InvalidDateRange(format!(
                "{from} is not before {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Creates a range from an inclusive pair of dates.
    ///
    /// Bare dates lift to UTC midnight: `[first, last]` becomes the
    /// half-open `[first 00:00, (last + 1 day) 00:00)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDateRange`] if `first > last` or
    /// the lifted end date overflows the calendar.
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> Result<Self, ValidationError> {
        if first > last {
            return Err(ValidationError::InvalidDateRange(format!(
                "{first} is after {last}"
            )));
        }
        let to = last
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ValidationError::InvalidDateRange(format!("{last} + 1 day overflows")))?;
        Self::new(midnight(first), midnight(to))
    }

    /// Returns true if the instant falls inside `[from, to)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant < self.to
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

/// Lifts a bare date to UTC midnight.
fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_rejects_inverted() {
        let from = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(TimeRange::new(from, to).is_err());
        assert!(TimeRange::new(from, from).is_err());
    }

    #[test]
    fn test_from_dates_lifts_to_half_open() {
        let first = NaiveDate::from_ymd_opt(2019, 2, 4).unwrap();
        let last = NaiveDate::from_ymd_opt(2019, 2, 5).unwrap();
        let range = TimeRange::from_dates(first, last).unwrap();

        assert_eq!(range.from, Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2019, 2, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_dates_single_day() {
        let day = NaiveDate::from_ymd_opt(2019, 2, 4).unwrap();
        let range = TimeRange::from_dates(day, day).unwrap();
        assert_eq!(range.to - range.from, chrono::TimeDelta::days(1));
    }

    #[test]
    fn test_contains_is_half_open() {
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2019, 2, 5, 0, 0, 0).unwrap(),
        )
        .unwrap();

        assert!(range.contains(range.from));
        assert!(!range.contains(range.to));
    }
}
