//! Policy calendar handling
//!
//! This module provides:
//! - Calendar-date parsing for the date formats claim records arrive in
//! - Policy periods with inclusive start and end dates

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date formats accepted for claim records, tried in order
pub const ACCEPTED_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: end {end} is before start {start}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Unrecognised date '{0}': expected YYYY-MM-DD, DD/MM/YYYY or DD-MM-YYYY")]
    UnparseableDate(String),
}

/// Time-of-day suffixes that may follow a date and are discarded
const ACCEPTED_TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Parses a calendar date in any of the [`ACCEPTED_DATE_FORMATS`]
///
/// Surrounding whitespace is ignored, as is a trailing time-of-day part
/// (`2024-06-15T00:00:00` or `2024-06-15 00:00:00`), which spreadsheet
/// exports commonly append. Anything else after the date is rejected, and
/// the year must be written with four digits.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, TemporalError> {
    let unparseable = || TemporalError::UnparseableDate(input.to_string());
    let trimmed = input.trim();

    let date_part = match trimmed.split_once(['T', ' ']) {
        Some((date, time)) => {
            let time = time.trim();
            let is_time = ACCEPTED_TIME_FORMATS
                .iter()
                .any(|format| NaiveTime::parse_from_str(time, format).is_ok());
            if !is_time {
                return Err(unparseable());
            }
            date
        }
        None => trimmed,
    };

    ACCEPTED_DATE_FORMATS
        .iter()
        .filter(|format| has_four_digit_year(date_part, format))
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .ok_or_else(unparseable)
}

/// chrono's `%Y` also accepts short years; claim records never use them
fn has_four_digit_year(date: &str, format: &str) -> bool {
    let components: Vec<&str> = date.split(['-', '/']).collect();
    let year = if format.starts_with("%Y") {
        components.first()
    } else {
        components.last()
    };
    components.len() == 3
        && year.is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
}

/// The period during which a policy is in force
///
/// Both bounds are inclusive: a loss on the start date or on the end date
/// falls within the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PolicyPeriod {
    /// Creates a new period; `end` may equal but not precede `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if end < start {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Returns true if the date falls within the period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days between start and end
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}
