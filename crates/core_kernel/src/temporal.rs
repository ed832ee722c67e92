//! Calendar math for reporting periods
//!
//! Balance facts are keyed by plain calendar dates. This module provides the
//! period-boundary functions the metrics engine compares against (calendar
//! quarters starting Jan/Apr/Jul/Oct 1, calendar years starting Jan 1) and
//! strict parsing of externally supplied dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("'{value}' is not a valid calendar date (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("invalid range: start {start} must not be after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl TemporalError {
    /// The offending input, echoed back for error reporting
    pub fn value(&self) -> String {
        match self {
            TemporalError::InvalidDate { value } => value.clone(),
            TemporalError::InvalidRange { start, end } => format!("{start}..{end}"),
        }
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// Used for every externally supplied date so malformed input is rejected
/// before any aggregation work starts, with the literal value preserved for
/// the error response.
pub fn parse_date(value: &str) -> Result<NaiveDate, TemporalError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| TemporalError::InvalidDate {
        value: value.to_string(),
    })
}

/// Returns the first day of the calendar quarter containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let quarter_month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), quarter_month, 1).unwrap()
}

/// Returns January 1 of `date`'s year.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap()
}

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The range covering the `days` days ending at `end` (inclusive)
    pub fn trailing_days(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - chrono::Duration::days(days),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}
