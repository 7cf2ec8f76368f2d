//! Calendar month-grid construction.

mod grid;

pub use grid::{build_month_grid, DayCell, MonthCursor, GRID_CELLS};
