/// Number of columns in a calendar grid row (Monday through Sunday)
pub const DAYS_PER_WEEK: u8 = 7;

/// Number of months in a year
pub const MONTHS_PER_YEAR: u8 = 12;

/// Largest row index a date can occupy within its month's grid.
/// The worst case is day 31 with a month-start offset of 6.
pub const MAX_WEEK_ROWS: u8 = 6;

/// First row of every month's grid
pub const FIRST_WEEK_ROW: u8 = 1;

/// Offset folded into the ISO weekday of a month's first day before the
/// modulo, see [`crate::week_of_month`]
pub(crate) const MONTH_START_SHIFT: u32 = 5;

/// Separator between month label and year in a panel label ("Jan 2023")
pub const MONTH_YEAR_SEPARATOR: char = ' ';

/// Range separator (ISO 8601 extended format)
pub const RANGE_SEPARATOR: char = '/';

/// Date format accepted and produced for range endpoints
pub const DATE_FORMAT: &str = "%Y-%m-%d";
