// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The month grid: a fixed 42-cell (6 x 7), Sunday-first calendar layout.
//!
//! Pure civil-date arithmetic. The grid always starts on the Sunday on or
//! before the 1st of the month and runs 42 consecutive days, so rendering
//! code never branches on month shape.

use chrono::{Datelike, Days, NaiveDate};

use upkeep_core::UpkeepError;

/// Number of cells in every month grid.
pub const GRID_CELLS: usize = 42;

/// One slot of the month grid. `in_month` is false for the leading and
/// trailing padding days borrowed from the neighboring months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlot {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// Lay out the 42-slot grid for `year`/`month`.
///
/// `month` must be 1..=12 and the year must be representable; both are
/// caller input, so violations surface as validation errors rather than
/// panics.
pub fn month_grid(year: i32, month: u32) -> Result<[GridSlot; GRID_CELLS], UpkeepError> {
    if !(1..=12).contains(&month) {
        return Err(UpkeepError::invalid_field(
            "month",
            format!("month must be 1-12, got {month}"),
        ));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        UpkeepError::invalid_field("year", format!("year {year} is out of range"))
    })?;

    let lead = first.weekday().num_days_from_sunday() as u64;
    let start = first
        .checked_sub_days(Days::new(lead))
        .ok_or_else(|| UpkeepError::invalid_field("year", "calendar start underflows"))?;

    let mut slots = [GridSlot { date: first, in_month: true }; GRID_CELLS];
    for (i, slot) in slots.iter_mut().enumerate() {
        let date = start
            .checked_add_days(Days::new(i as u64))
            .ok_or_else(|| UpkeepError::invalid_field("year", "calendar end overflows"))?;
        *slot = GridSlot {
            date,
            in_month: date.year() == year && date.month() == month,
        };
    }
    Ok(slots)
}
