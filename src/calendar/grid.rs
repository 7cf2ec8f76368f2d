//! Month grid construction.
//!
//! Maps a displayed (year, month) to the fixed 6×7 cell sequence a
//! month view renders: leading blanks up to the first weekday, one cell
//! per day carrying event/selection/today flags, trailing blanks to keep
//! the grid height stable across months.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fixed grid size: 6 rows of 7 weekday columns.
pub const GRID_CELLS: usize = 42;

/// One rendered day position. Blank cells (no date) pad the first and
/// last week rows; selecting one is a no-op by construction, since there
/// is no date to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub has_event: bool,
    pub is_selected: bool,
    pub is_today: bool,
}

impl DayCell {
    const BLANK: DayCell = DayCell {
        date: None,
        has_event: false,
        is_selected: false,
        is_today: false,
    };

    /// Whether this is a padding cell.
    pub fn is_blank(&self) -> bool {
        self.date.is_none()
    }

    /// Day of month, for content cells.
    pub fn day(&self) -> Option<u32> {
        self.date.map(|d| d.day())
    }
}

/// The displayed (year, zero-based month) pair, with rollover-aware
/// navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCursor {
    year: i32,
    month0: u32,
}

impl MonthCursor {
    /// Create a cursor; `month0` is zero-based (0 = January).
    pub fn new(year: i32, month0: u32) -> Result<Self, ValidationError> {
        if month0 >= 12 {
            return Err(ValidationError::InvalidMonth(month0));
        }
        Ok(Self { year, month0 })
    }

    /// The cursor for the month containing a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month (0 = January).
    pub fn month0(&self) -> u32 {
        self.month0
    }

    /// Previous month; January rolls to December of the previous year.
    pub fn prev(self) -> Self {
        if self.month0 == 0 {
            Self {
                year: self.year - 1,
                month0: 11,
            }
        } else {
            Self {
                year: self.year,
                month0: self.month0 - 1,
            }
        }
    }

    /// Next month; December rolls to January of the next year.
    pub fn next(self) -> Self {
        if self.month0 == 11 {
            Self {
                year: self.year + 1,
                month0: 0,
            }
        } else {
            Self {
                year: self.year,
                month0: self.month0 + 1,
            }
        }
    }

    /// First calendar day of the month. `None` outside chrono's
    /// representable year range.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1)
    }

    /// Number of days in the month: the span up to day one of the next
    /// month.
    pub fn days_in_month(&self) -> Option<u32> {
        let first = self.first_day()?;
        let next_first = self.next().first_day()?;
        Some((next_first - first).num_days() as u32)
    }
}

/// Build the 42-cell grid for a month.
///
/// Pure: `today` is supplied by the caller, so identical arguments always
/// yield the identical sequence. `event_dates` is a set, so duplicate
/// appointments on a date mark its cell once. A cursor outside chrono's
/// year range yields an all-blank grid.
pub fn build_month_grid(
    cursor: MonthCursor,
    event_dates: &BTreeSet<NaiveDate>,
    selected: NaiveDate,
    today: NaiveDate,
) -> Vec<DayCell> {
    let (Some(first), Some(days)) = (cursor.first_day(), cursor.days_in_month()) else {
        return vec![DayCell::BLANK; GRID_CELLS];
    };

    let leading = first.weekday().num_days_from_sunday() as usize;
    let mut cells = Vec::with_capacity(GRID_CELLS);
    cells.resize(leading, DayCell::BLANK);

    for date in first.iter_days().take(days as usize) {
        cells.push(DayCell {
            date: Some(date),
            has_event: event_dates.contains(&date),
            is_selected: date == selected,
            is_today: date == today,
        });
    }

    cells.resize(GRID_CELLS, DayCell::BLANK);
    cells
}
