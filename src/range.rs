use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{DATE_FORMAT, RANGE_SEPARATOR, clock::Clock};

/// An inclusive range of calendar days.
/// The start date must be less than or equal to the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end:   NaiveDate,
}

/// A single day paired with its value, in the order the caller supplied it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateValueRecord {
    pub date:  NaiveDate,
    pub value: f64,
}

/// Error type for date range operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Start date is after end date.
    #[error("Invalid date range: end ({end}) precedes start ({start})")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Invalid range or date format.
    #[error("Invalid range format: {0}")]
    InvalidFormat(String),
}

impl DateRange {
    /// Creates a new date range with validation.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidRange` if end < start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range from `start` through the clock's current day.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidRange` if `start` lies in the future.
    pub fn ending_today(start: NaiveDate, clock: &impl Clock) -> Result<Self, RangeError> {
        Self::new(start, clock.today())
    }

    /// Returns the first day of the range
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range (inclusive)
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both endpoints
    pub fn num_days(&self) -> usize {
        // end >= start is checked on construction
        let span = self.end.signed_duration_since(self.start).num_days();
        usize::try_from(span).map_or(0, |days| days + 1)
    }

    /// Iterates every day in the range in ascending order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Checks if the range contains a given day
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    /// Pairs each day in the range with the value at the same position.
    /// Stops at whichever side runs out first; length checks belong to the caller.
    pub fn zip_values<'a>(&self, values: &'a [f64]) -> impl Iterator<Item = DateValueRecord> + use<'a> {
        self.days()
            .zip(values.iter().copied())
            .map(|(date, value)| DateValueRecord { date, value })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{RANGE_SEPARATOR}{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| RangeError::InvalidFormat(s.to_owned()))
}

impl FromStr for DateRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let separator_count = trimmed.matches(RANGE_SEPARATOR).count();

        match separator_count {
            0 => Err(RangeError::InvalidFormat(format!(
                "No range separator found (expected '{RANGE_SEPARATOR}'): {s}"
            ))),
            1 => {
                let (start_str, end_str) = trimmed.split_once(RANGE_SEPARATOR).ok_or_else(|| {
                    RangeError::InvalidFormat(format!("Separator '{RANGE_SEPARATOR}' not found in {s}"))
                })?;

                let start = parse_date(start_str.trim())?;
                let end = parse_date(end_str.trim())?;

                Self::new(start, end)
            },
            _ => Err(RangeError::InvalidFormat(format!(
                "Too many '{RANGE_SEPARATOR}' separators: expected 1, found {separator_count}"
            ))),
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
