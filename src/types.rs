use crate::consts::{DAYS_PER_WEEK, FIRST_WEEK_ROW, MAX_WEEK_ROWS, MONTHS_PER_YEAR};
use crate::prelude::*;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;
use std::str::FromStr;

/// Error returned when a label or grid index cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LabelError {
    #[display(fmt = "Unknown month label: {_0}")]
    UnknownMonth(String),
    #[display(fmt = "Invalid month number: {} (must be 1-{})", "_0", MONTHS_PER_YEAR)]
    InvalidMonth(u32),
    #[display(fmt = "Unknown weekday label: {_0}")]
    UnknownWeekday(String),
    #[display(fmt = "Invalid weekday number: {} (must be 1-{})", "_0", DAYS_PER_WEEK)]
    InvalidWeekday(u32),
    #[display(fmt = "Invalid week of month: {} (must be 1-{})", "_0", MAX_WEEK_ROWS)]
    InvalidWeek(u8),
}

impl std::error::Error for LabelError {}

/// Abbreviated month name, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum MonthLabel {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl MonthLabel {
    /// All labels in canonical order
    pub const ALL: [Self; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    const FULL_NAMES: [&'static str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    /// Builds a label from a 1-based month number
    ///
    /// # Errors
    /// Returns `LabelError::InvalidMonth` if the number is outside `1..=12`.
    pub fn from_number(number: u32) -> Result<Self, LabelError> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize).copied())
            .ok_or(LabelError::InvalidMonth(number))
    }

    /// Label for the month `date` falls in
    pub fn of(date: NaiveDate) -> Self {
        // chrono guarantees month0() < 12
        Self::ALL[date.month0() as usize]
    }

    /// Returns the 1-based month number (January = 1)
    #[inline]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Three-letter abbreviation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jan => "Jan",
            Self::Feb => "Feb",
            Self::Mar => "Mar",
            Self::Apr => "Apr",
            Self::May => "May",
            Self::Jun => "Jun",
            Self::Jul => "Jul",
            Self::Aug => "Aug",
            Self::Sep => "Sep",
            Self::Oct => "Oct",
            Self::Nov => "Nov",
            Self::Dec => "Dec",
        }
    }
}

impl FromStr for MonthLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .zip(Self::FULL_NAMES)
            .find(|(label, full)| lowered == label.as_str().to_ascii_lowercase() || lowered == *full)
            .map(|(label, _)| *label)
            .ok_or_else(|| LabelError::UnknownMonth(s.to_owned()))
    }
}

/// Abbreviated weekday name, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum WeekdayLabel {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekdayLabel {
    /// All labels in canonical (grid column) order
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    const FULL_NAMES: [&'static str; 7] = [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];

    /// Builds a label from an ISO weekday number (Monday = 1 .. Sunday = 7)
    ///
    /// # Errors
    /// Returns `LabelError::InvalidWeekday` if the number is outside `1..=7`.
    pub fn from_number(number: u32) -> Result<Self, LabelError> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize).copied())
            .ok_or(LabelError::InvalidWeekday(number))
    }

    /// Label for the weekday of `date`
    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }

    /// ISO weekday number (Monday = 1 .. Sunday = 7)
    #[inline]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Zero-based grid column (Monday = 0)
    #[inline]
    pub const fn column(self) -> usize {
        self as usize
    }

    /// Three-letter abbreviation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }
}

impl FromStr for WeekdayLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .zip(Self::FULL_NAMES)
            .find(|(label, full)| lowered == label.as_str().to_ascii_lowercase() || lowered == *full)
            .map(|(label, _)| *label)
            .ok_or_else(|| LabelError::UnknownWeekday(s.to_owned()))
    }
}

// Labels travel as their three-letter abbreviation
macro_rules! label_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

label_serde!(MonthLabel);
label_serde!(WeekdayLabel);

/// A grid row index guaranteed to be in the range `1..=MAX_WEEK_ROWS` (1..=6)
/// Uses `NonZeroU8` internally, so 0 is not a valid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekOfMonth(NonZeroU8);

impl WeekOfMonth {
    /// The first row of every month
    pub const FIRST: Self = match NonZeroU8::new(FIRST_WEEK_ROW) {
        Some(row) => Self(row),
        None => unreachable!(),
    };

    /// Creates a new row index, validating that it's non-zero and <= `MAX_WEEK_ROWS`
    ///
    /// # Errors
    /// Returns `LabelError::InvalidWeek` if the value is 0 or > `MAX_WEEK_ROWS`.
    pub fn new(value: u8) -> Result<Self, LabelError> {
        let non_zero = NonZeroU8::new(value).ok_or(LabelError::InvalidWeek(value))?;
        if value > MAX_WEEK_ROWS {
            return Err(LabelError::InvalidWeek(value));
        }
        Ok(Self(non_zero))
    }

    /// Clamps `value` into `1..=MAX_WEEK_ROWS`
    pub(crate) const fn saturating(value: u8) -> Self {
        let clamped = if value > MAX_WEEK_ROWS { MAX_WEEK_ROWS } else { value };
        match NonZeroU8::new(clamped) {
            Some(row) => Self(row),
            None => Self::FIRST,
        }
    }

    /// Returns the row value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Zero-based grid row (week 1 = 0)
    #[inline]
    pub const fn row(self) -> usize {
        (self.0.get() - FIRST_WEEK_ROW) as usize
    }
}

impl TryFrom<u8> for WeekOfMonth {
    type Error = LabelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeekOfMonth> for u8 {
    fn from(week: WeekOfMonth) -> Self {
        week.0.get()
    }
}

impl fmt::Display for WeekOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
