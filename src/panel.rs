//! Month-year panels: the grouping renderers draw one sub-grid for.

use tracing::debug;

use crate::{CalendarCell, DAYS_PER_WEEK, MonthLabel, WeekOfMonth, WeekdayLabel};

/// One month's worth of cells, borrowed from the mapped sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel<'a> {
    cells: &'a [CalendarCell],
}

/// A grid row, Monday first. Days outside the input are `None`.
pub type GridRow<'a> = [Option<&'a CalendarCell>; DAYS_PER_WEEK as usize];

impl<'a> Panel<'a> {
    /// Panel key shared by every cell, e.g. "Jan 2023"
    pub fn label(&self) -> &'a str {
        self.first().month_year_label()
    }

    pub fn year(&self) -> i32 {
        self.first().year()
    }

    pub fn month(&self) -> MonthLabel {
        self.first().month()
    }

    /// Cells of this panel in date order
    pub const fn cells(&self) -> &'a [CalendarCell] {
        self.cells
    }

    /// Number of grid rows needed to draw the panel
    pub fn rows(&self) -> u8 {
        self.cells
            .iter()
            .map(|c| c.week_of_month().get())
            .max()
            .unwrap_or_default()
    }

    /// The cell drawn at the given row and column, if any
    pub fn cell_at(&self, week: WeekOfMonth, weekday: WeekdayLabel) -> Option<&'a CalendarCell> {
        self.cells
            .iter()
            .find(|c| c.week_of_month() == week && c.weekday() == weekday)
    }

    /// Rows of the panel top to bottom, each holding its seven columns
    pub fn grid(&self) -> Vec<GridRow<'a>> {
        let mut rows: Vec<GridRow<'a>> = vec![[None; DAYS_PER_WEEK as usize]; usize::from(self.rows())];
        for cell in self.cells {
            rows[cell.week_of_month().row()][cell.weekday().column()] = Some(cell);
        }
        rows
    }

    fn first(&self) -> &'a CalendarCell {
        // panels are only built from non-empty chunks
        &self.cells[0]
    }
}

/// Splits mapped cells into one panel per month, in the order they appear.
/// Expects cells in date order, as produced by [`crate::map`].
pub fn panels(cells: &[CalendarCell]) -> Vec<Panel<'_>> {
    let panels: Vec<Panel<'_>> = cells
        .chunk_by(|a, b| a.month_year_label() == b.month_year_label())
        .map(|chunk| Panel { cells: chunk })
        .collect();
    debug!(panels = panels.len(), cells = cells.len(), "grouped cells into month panels");
    panels
}
