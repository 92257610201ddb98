// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side views over the maintenance job store: the month calendar,
//! the upcoming list, per-property open counts, and the maintenance log.

pub mod calendar;
pub mod views;

pub use calendar::{GRID_CELLS, GridSlot, month_grid};
pub use views::{
    CalendarCell, CalendarMonth, DEFAULT_UPCOMING_LIMIT, JobMarker, LogStats, MaintenanceLog,
    PropertyOpenCount, ScheduleViews,
};
