mod clock;
mod consts;
mod panel;
mod prelude;
mod range;
mod render;
mod synthetic;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use consts::*;
pub use panel::{GridRow, Panel, panels};
pub use range::{DateRange, DateValueRecord, RangeError};
pub use render::{ColorError, Palette, RenderOptions, Renderer, Rgb, TextRenderer};
pub use synthetic::{SyntheticReturns, add_in_month, add_on_weekday};
pub use types::{LabelError, MonthLabel, WeekOfMonth, WeekdayLabel};

use chrono::{Datelike, NaiveDate};
use consts::MONTH_START_SHIFT;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One day of the input placed on its month's calendar grid.
///
/// Cells are built by [`map`] and never mutated afterwards; renderers group
/// them by [`CalendarCell::month_year_label`] into panels, lay them out with
/// the weekday as column and [`CalendarCell::week_of_month`] as row, and color
/// them by [`CalendarCell::value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CellFields")]
pub struct CalendarCell {
    date:             NaiveDate,
    value:            f64,
    year:             i32,
    #[serde(rename = "month_label")]
    month:            MonthLabel,
    #[serde(rename = "weekday_label")]
    weekday:          WeekdayLabel,
    week_of_month:    WeekOfMonth,
    month_year_label: String,
}

impl CalendarCell {
    /// The day this cell represents
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The caller's value for this day, unchanged
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Calendar year of the date
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Abbreviated month of the date
    pub const fn month(&self) -> MonthLabel {
        self.month
    }

    /// Abbreviated weekday of the date (grid column)
    pub const fn weekday(&self) -> WeekdayLabel {
        self.weekday
    }

    /// Grid row within the month, starting at 1
    pub const fn week_of_month(&self) -> WeekOfMonth {
        self.week_of_month
    }

    /// Panel key, e.g. "Mar 2023"
    pub fn month_year_label(&self) -> &str {
        &self.month_year_label
    }
}

impl From<DateValueRecord> for CalendarCell {
    fn from(record: DateValueRecord) -> Self {
        let DateValueRecord { date, value } = record;
        let year = date.year();
        let month = MonthLabel::of(date);
        Self {
            date,
            value,
            year,
            month,
            weekday: WeekdayLabel::of(date),
            week_of_month: week_of_month(date),
            month_year_label: format!("{month}{MONTH_YEAR_SEPARATOR}{year}"),
        }
    }
}

/// Serialized form of a cell. Every field but `date` and `value` is derived,
/// so deserializing rebuilds the cell and rejects fields that disagree.
#[derive(Deserialize)]
struct CellFields {
    date:             NaiveDate,
    value:            f64,
    year:             i32,
    month_label:      MonthLabel,
    weekday_label:    WeekdayLabel,
    week_of_month:    WeekOfMonth,
    month_year_label: String,
}

/// Error returned when a serialized cell contradicts its own date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    #[error("Cell for {date} has a non-finite value")]
    NonFiniteValue { date: NaiveDate },

    #[error("Cell for {date} has {field} {found}, expected {expected}")]
    Mismatch {
        date:     NaiveDate,
        field:    &'static str,
        found:    String,
        expected: String,
    },
}

impl TryFrom<CellFields> for CalendarCell {
    type Error = CellError;

    fn try_from(fields: CellFields) -> Result<Self, Self::Error> {
        let date = fields.date;
        if !fields.value.is_finite() {
            return Err(CellError::NonFiniteValue { date });
        }
        let cell = Self::from(DateValueRecord {
            date,
            value: fields.value,
        });

        let check = |field: &'static str, found: String, expected: String| {
            if found == expected {
                Ok(())
            } else {
                Err(CellError::Mismatch {
                    date,
                    field,
                    found,
                    expected,
                })
            }
        };
        check("year", fields.year.to_string(), cell.year.to_string())?;
        check("month_label", fields.month_label.to_string(), cell.month.to_string())?;
        check("weekday_label", fields.weekday_label.to_string(), cell.weekday.to_string())?;
        check("week_of_month", fields.week_of_month.to_string(), cell.week_of_month.to_string())?;
        check("month_year_label", fields.month_year_label, cell.month_year_label.clone())?;
        Ok(cell)
    }
}

/// Error type for calendar grid mapping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// A value is NaN or infinite.
    #[error("Invalid input: value at index {index} is not a finite number ({value})")]
    InvalidInput { index: usize, value: f64 },

    /// End date precedes start date.
    #[error("Invalid date range: end ({end}) precedes start ({start})")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Value count differs from the number of days in the range.
    #[error("Length mismatch: {provided} values provided but the date range spans {expected} days")]
    LengthMismatch { provided: usize, expected: usize },
}

/// Error type for [`plot`]: either the input failed validation or the renderer failed.
#[derive(Debug, thiserror::Error)]
pub enum PlotError<E> {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Rendering failed: {0}")]
    Render(E),
}

/// Places each day of `start..=end` on its month's calendar grid, pairing it
/// with the value at the same position.
///
/// # Errors
/// Checked in order, first failure wins:
/// - `GridError::InvalidInput` if any value is NaN or infinite
/// - `GridError::InvalidRange` if `end < start`
/// - `GridError::LengthMismatch` if `values.len()` differs from the number of days
pub fn map(values: &[f64], start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarCell>, GridError> {
    check_finite(values)?;
    let range = DateRange::new(start, end).map_err(|_| GridError::InvalidRange { start, end })?;
    map_checked(values, &range)
}

/// Same as [`map`] for an already validated range.
///
/// # Errors
/// Returns `GridError::InvalidInput` or `GridError::LengthMismatch`.
pub fn map_range(values: &[f64], range: &DateRange) -> Result<Vec<CalendarCell>, GridError> {
    check_finite(values)?;
    map_checked(values, range)
}

fn check_finite(values: &[f64]) -> Result<(), GridError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(GridError::InvalidInput {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

fn map_checked(values: &[f64], range: &DateRange) -> Result<Vec<CalendarCell>, GridError> {
    let expected = range.num_days();
    if values.len() != expected {
        return Err(GridError::LengthMismatch {
            provided: values.len(),
            expected,
        });
    }

    let cells: Vec<CalendarCell> = range.zip_values(values).map(CalendarCell::from).collect();
    debug!(%range, cells = cells.len(), "mapped values onto calendar grid");
    Ok(cells)
}

/// Grid row of `date` within its month.
///
/// The ISO weekday of the month's first day is folded into an offset
/// `((iso + 5) mod 7) + 1`, and the row is
/// `floor((days_into_month + offset - 1) / 7) + 1`. The first of every month
/// is therefore always row 1 and the last row is at most `MAX_WEEK_ROWS`.
pub fn week_of_month(date: NaiveDate) -> WeekOfMonth {
    let days_into_month = date.day0();
    let days_per_week = u32::from(DAYS_PER_WEEK);

    // weekday of the 1st, counted from Monday = 0
    let start_from_monday =
        (date.weekday().num_days_from_monday() + days_per_week - days_into_month % days_per_week) % days_per_week;
    let month_start_iso = start_from_monday + 1;
    let first_weekday = (month_start_iso + MONTH_START_SHIFT) % days_per_week + 1;

    let week = (days_into_month + first_weekday - 1) / days_per_week + 1;
    debug_assert!(week <= u32::from(MAX_WEEK_ROWS));
    WeekOfMonth::saturating(u8::try_from(week).unwrap_or(MAX_WEEK_ROWS))
}

/// Maps the input and hands the cells to `renderer`.
/// Validation errors surface before the renderer is called.
///
/// # Errors
/// Returns `PlotError::Grid` on invalid input and `PlotError::Render` if the renderer fails.
pub fn plot<R: Renderer>(
    values: &[f64],
    start: NaiveDate,
    end: NaiveDate,
    options: &RenderOptions,
    renderer: &mut R,
) -> Result<R::Output, PlotError<R::Error>> {
    let cells = map(values, start, end)?;
    renderer.render(&cells, options).map_err(PlotError::Render)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;
    use proptest::prelude::*;

    #[test]
    fn test_first_week_scenario() {
        let values = [0.01, -0.02, 0.0, 0.015, -0.01, 0.03, -0.005];
        let cells = map(&values, date(2023, 1, 1), date(2023, 1, 7)).unwrap();

        assert_eq!(cells.len(), 7);

        let first = &cells[0];
        assert_eq!(first.date(), date(2023, 1, 1));
        assert_eq!(first.value(), 0.01);
        assert_eq!(first.year(), 2023);
        assert_eq!(first.month(), MonthLabel::Jan);
        assert_eq!(first.weekday(), WeekdayLabel::Sun);
        assert_eq!(first.week_of_month().get(), 1);
        assert_eq!(first.month_year_label(), "Jan 2023");

        let last = &cells[6];
        assert_eq!(last.date(), date(2023, 1, 7));
        assert_eq!(last.weekday(), WeekdayLabel::Sat);
        assert_eq!(last.week_of_month().get(), 2);

        let weeks: Vec<u8> = cells.iter().map(|c| c.week_of_month().get()).collect();
        assert_eq!(weeks, vec![1, 1, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_full_year() {
        let values = vec![0.001; 365];
        let cells = map(&values, date(2023, 1, 1), date(2023, 12, 31)).unwrap();
        assert_eq!(cells.len(), 365);

        let mut labels: Vec<&str> = cells.iter().map(CalendarCell::month_year_label).collect();
        labels.dedup();
        assert_eq!(
            labels,
            vec![
                "Jan 2023", "Feb 2023", "Mar 2023", "Apr 2023", "May 2023", "Jun 2023", "Jul 2023", "Aug 2023",
                "Sep 2023", "Oct 2023", "Nov 2023", "Dec 2023",
            ]
        );
    }

    #[test]
    fn test_week_of_month_cases() {
        struct TestCase {
            date:        NaiveDate,
            week:        u8,
            description: &'static str,
        }

        let cases = [
            TestCase {
                date:        date(2023, 1, 2),
                week:        1,
                description: "month starting Sunday, first Monday",
            },
            TestCase {
                date:        date(2023, 1, 3),
                week:        2,
                description: "month starting Sunday, first Tuesday",
            },
            TestCase {
                date:        date(2023, 1, 31),
                week:        6,
                description: "month starting Sunday, day 31",
            },
            TestCase {
                date:        date(2023, 2, 1),
                week:        1,
                description: "month starting Wednesday",
            },
            TestCase {
                date:        date(2023, 2, 7),
                week:        2,
                description: "month starting Wednesday, first Tuesday",
            },
            TestCase {
                date:        date(2023, 2, 28),
                week:        5,
                description: "non-leap February end",
            },
            TestCase {
                date:        date(2023, 5, 1),
                week:        1,
                description: "month starting Monday",
            },
            TestCase {
                date:        date(2023, 5, 2),
                week:        2,
                description: "month starting Monday, day 2",
            },
            TestCase {
                date:        date(2023, 8, 7),
                week:        1,
                description: "month starting Tuesday, day 7",
            },
            TestCase {
                date:        date(2023, 8, 8),
                week:        2,
                description: "month starting Tuesday, day 8",
            },
        ];

        for case in &cases {
            assert_eq!(
                week_of_month(case.date).get(),
                case.week,
                "{} ({})",
                case.date,
                case.description
            );
        }
    }

    #[test]
    fn test_first_of_month_is_week_one() {
        for year in 1990..=2030 {
            for month in 1..=12 {
                let first = date(year, month, 1);
                assert_eq!(week_of_month(first), WeekOfMonth::FIRST, "first of {first}");
            }
        }
    }

    #[test]
    fn test_length_mismatch() {
        let values = [0.0; 10];
        let result = map(&values, date(2023, 1, 1), date(2023, 1, 5));
        assert_eq!(
            result,
            Err(GridError::LengthMismatch {
                provided: 10,
                expected: 5
            })
        );

        let err = result.unwrap_err().to_string();
        assert!(err.contains("10"), "message should report provided length: {err}");
        assert!(err.contains('5'), "message should report expected days: {err}");
    }

    #[test]
    fn test_empty_values() {
        let result = map(&[], date(2023, 1, 1), date(2023, 1, 1));
        assert_eq!(
            result,
            Err(GridError::LengthMismatch {
                provided: 0,
                expected: 1
            })
        );
    }

    #[test]
    fn test_invalid_range() {
        let result = map(&[0.0, 0.0], date(2023, 1, 5), date(2023, 1, 4));
        assert_eq!(
            result,
            Err(GridError::InvalidRange {
                start: date(2023, 1, 5),
                end:   date(2023, 1, 4),
            })
        );
    }

    #[test]
    fn test_invalid_input() {
        let result = map(&[0.0, f64::NAN, 0.0], date(2023, 1, 1), date(2023, 1, 3));
        assert!(matches!(result, Err(GridError::InvalidInput { index: 1, .. })));

        let result = map(&[f64::INFINITY], date(2023, 1, 1), date(2023, 1, 1));
        assert!(matches!(result, Err(GridError::InvalidInput { index: 0, .. })));
    }

    #[test]
    fn test_validation_order() {
        // bad value, inverted range and wrong length: the value check wins
        let result = map(&[f64::NEG_INFINITY], date(2023, 1, 5), date(2023, 1, 1));
        assert!(matches!(result, Err(GridError::InvalidInput { .. })));

        // inverted range and wrong length: the range check wins
        let result = map(&[0.0; 3], date(2023, 1, 5), date(2023, 1, 1));
        assert!(matches!(result, Err(GridError::InvalidRange { .. })));
    }

    #[test]
    fn test_map_range() {
        let range: DateRange = "2024-02-28/2024-03-01".parse().unwrap();
        let cells = map_range(&[1.0, 2.0, 3.0], &range).unwrap();
        assert_eq!(cells[1].date(), date(2024, 2, 29));
        assert_eq!(cells[1].month_year_label(), "Feb 2024");
        assert_eq!(cells[2].month_year_label(), "Mar 2024");
        assert_eq!(cells[2].week_of_month(), WeekOfMonth::FIRST);

        let result = map_range(&[1.0], &range);
        assert!(matches!(result, Err(GridError::LengthMismatch { provided: 1, expected: 3 })));
    }

    #[test]
    fn test_cell_serde() {
        let cells = map(&[-0.25], date(2023, 3, 15), date(2023, 3, 15)).unwrap();
        let json = serde_json::to_value(&cells[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "2023-03-15",
                "value": -0.25,
                "year": 2023,
                "month_label": "Mar",
                "weekday_label": "Wed",
                "week_of_month": 3,
                "month_year_label": "Mar 2023",
            })
        );

        let parsed: CalendarCell = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, cells[0]);
    }

    #[test]
    fn test_cell_deserialize_rejects_fields_that_contradict_date() {
        struct TestCase {
            field: &'static str,
            value: serde_json::Value,
        }

        let cases = [
            TestCase { field: "year", value: serde_json::json!(1999) },
            TestCase { field: "month_label", value: serde_json::json!("Dec") },
            TestCase { field: "weekday_label", value: serde_json::json!("Mon") },
            TestCase { field: "week_of_month", value: serde_json::json!(6) },
            TestCase { field: "month_year_label", value: serde_json::json!("Foo Bar") },
        ];

        let cells = map(&[0.5], date(2023, 3, 15), date(2023, 3, 15)).unwrap();
        for case in &cases {
            let mut json = serde_json::to_value(&cells[0]).unwrap();
            json[case.field] = case.value.clone();

            let err = serde_json::from_value::<CalendarCell>(json).unwrap_err().to_string();
            assert!(err.contains(case.field), "{}: {err}", case.field);
            assert!(err.contains("2023-03-15"), "{}: {err}", case.field);
        }

        let inconsistent = serde_json::json!({
            "date": "2023-03-15",
            "value": 0.5,
            "year": 1999,
            "month_label": "Dec",
            "weekday_label": "Mon",
            "week_of_month": 6,
            "month_year_label": "Foo Bar",
        });
        assert!(serde_json::from_value::<CalendarCell>(inconsistent).is_err());
    }

    #[test]
    fn test_plot_rejects_before_rendering() {
        struct CountingRenderer {
            calls: usize,
        }

        impl Renderer for CountingRenderer {
            type Error = std::convert::Infallible;
            type Output = usize;

            fn render(&mut self, cells: &[CalendarCell], _options: &RenderOptions) -> Result<usize, Self::Error> {
                self.calls += 1;
                Ok(cells.len())
            }
        }

        let mut renderer = CountingRenderer { calls: 0 };
        let options = RenderOptions::default();

        let drawn = plot(&[0.1, 0.2], date(2023, 1, 1), date(2023, 1, 2), &options, &mut renderer).unwrap();
        assert_eq!(drawn, 2);
        assert_eq!(renderer.calls, 1);

        let result = plot(&[0.1], date(2023, 1, 1), date(2023, 1, 2), &options, &mut renderer);
        assert!(matches!(result, Err(PlotError::Grid(GridError::LengthMismatch { .. }))));
        assert_eq!(renderer.calls, 1);
    }

    fn range_and_values() -> impl Strategy<Value = (NaiveDate, NaiveDate, Vec<f64>)> {
        (0u64..20_000, prop::collection::vec(-1.0f64..1.0, 1..800)).prop_map(|(offset, values)| {
            let start = date(1990, 1, 1) + chrono::Days::new(offset);
            let end = start + chrono::Days::new(values.len() as u64 - 1);
            (start, end, values)
        })
    }

    proptest! {
        #[test]
        fn prop_one_cell_per_day((start, end, values) in range_and_values()) {
            let cells = map(&values, start, end).unwrap();
            prop_assert_eq!(cells.len(), values.len());
            prop_assert_eq!(cells[0].date(), start);
            prop_assert_eq!(cells[cells.len() - 1].date(), end);
            for pair in cells.windows(2) {
                prop_assert_eq!(pair[0].date().succ_opt(), Some(pair[1].date()));
            }
        }

        #[test]
        fn prop_values_pass_through((start, end, values) in range_and_values()) {
            let cells = map(&values, start, end).unwrap();
            for (cell, value) in cells.iter().zip(&values) {
                prop_assert_eq!(cell.value().to_bits(), value.to_bits());
            }
        }

        #[test]
        fn prop_week_never_decreases_within_month((start, end, values) in range_and_values()) {
            let cells = map(&values, start, end).unwrap();
            for pair in cells.windows(2) {
                if pair[0].month_year_label() == pair[1].month_year_label() {
                    prop_assert!(pair[0].week_of_month() <= pair[1].week_of_month());
                } else {
                    prop_assert_eq!(pair[1].week_of_month(), WeekOfMonth::FIRST);
                }
            }
        }

        #[test]
        fn prop_cell_fields_agree_with_date((start, end, values) in range_and_values()) {
            let cells = map(&values, start, end).unwrap();
            for cell in &cells {
                prop_assert_eq!(cell.year(), cell.date().year());
                prop_assert_eq!(cell.month().number(), cell.date().month());
                prop_assert_eq!(cell.weekday().number(), cell.date().weekday().number_from_monday());
                prop_assert_eq!(cell.month_year_label(), format!("{} {}", cell.month(), cell.year()));
            }
        }
    }
}
