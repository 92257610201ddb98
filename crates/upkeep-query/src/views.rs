// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side projections over the job store.
//!
//! Every view is recomputed from the live job set on each call; nothing here
//! is materialized, so the views can never drift from the store.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use upkeep_core::UpkeepError;
use upkeep_core::types::{JobStatus, MaintenanceJob, Priority, SchedulerFilter, StatusCounts};
use upkeep_storage::Database;
use upkeep_storage::queries::jobs;

use crate::calendar::{self, GRID_CELLS};

/// Default truncation for the upcoming view.
pub const DEFAULT_UPCOMING_LIMIT: i64 = 10;

/// Lightweight marker for one job inside a calendar cell. The full record
/// stays behind the jobs routes; the grid only needs enough to render.
#[derive(Debug, Clone, Serialize)]
pub struct JobMarker {
    pub id: i64,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: JobStatus,
    pub priority: Priority,
}

impl From<&MaintenanceJob> for JobMarker {
    fn from(job: &MaintenanceJob) -> Self {
        JobMarker {
            id: job.id,
            job_type: job.job_type.clone(),
            status: job.status,
            priority: job.priority,
        }
    }
}

/// One cell of the rendered month view.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarCell {
    /// Civil date, `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// False for padding days borrowed from adjacent months; padding cells
    /// carry no job data.
    pub in_month: bool,
    /// Markers for jobs dated exactly on this cell, passing the request
    /// filter.
    pub jobs: Vec<JobMarker>,
    pub counts: StatusCounts,
}

/// A full month view: always 42 cells, Sunday-first.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CalendarCell>,
}

/// Open-job tally for one property.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PropertyOpenCount {
    pub property_id: i64,
    pub open_jobs: i64,
}

/// The maintenance log: the filtered history plus its status tallies.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceLog {
    pub jobs: Vec<MaintenanceJob>,
    pub stats: LogStats,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LogStats {
    pub total: i64,
    pub pending: i64,
    pub ongoing: i64,
    pub completed: i64,
}

impl From<StatusCounts> for LogStats {
    fn from(counts: StatusCounts) -> Self {
        LogStats {
            total: counts.total(),
            pending: counts.pending,
            ongoing: counts.ongoing,
            completed: counts.completed,
        }
    }
}

/// Read-side facade over the store.
#[derive(Clone)]
pub struct ScheduleViews {
    db: Database,
}

impl ScheduleViews {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Bucket the month's jobs into the 42-cell grid.
    ///
    /// A job lands in the cell whose civil date equals the job's `date`
    /// field, component for component. Padding cells stay empty; they exist
    /// only to keep the grid shape fixed.
    pub async fn calendar_month(
        &self,
        year: i32,
        month: u32,
        filter: SchedulerFilter,
    ) -> Result<CalendarMonth, UpkeepError> {
        let grid = calendar::month_grid(year, month)?;
        let first_of_month = grid.iter().find(|s| s.in_month).map(|s| s.date);
        let last_of_month = grid.iter().rev().find(|s| s.in_month).map(|s| s.date);

        // One ranged query for the month, tightened against any caller
        // range rather than replacing it.
        let mut window = filter;
        window.start_date = match (window.start_date, first_of_month) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        window.end_date = match (window.end_date, last_of_month) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let jobs = jobs::list_jobs(&self.db, window).await?;

        let mut by_date: HashMap<NaiveDate, Vec<MaintenanceJob>> = HashMap::new();
        for job in jobs {
            by_date.entry(job.date).or_default().push(job);
        }

        let cells = grid
            .iter()
            .map(|slot| {
                let mut day_jobs = if slot.in_month {
                    by_date.remove(&slot.date).unwrap_or_default()
                } else {
                    Vec::new()
                };
                // The store returns date-descending; within a single day
                // order by id so the cell reads in creation order.
                day_jobs.sort_by_key(|job| job.id);
                let mut counts = StatusCounts::default();
                for job in &day_jobs {
                    counts.record(job.status);
                }
                CalendarCell {
                    date: slot.date,
                    in_month: slot.in_month,
                    jobs: day_jobs.iter().map(JobMarker::from).collect(),
                    counts,
                }
            })
            .collect();

        tracing::debug!(year, month, "calendar month computed");
        Ok(CalendarMonth { year, month, cells })
    }

    /// Jobs dated on or after `today`, soonest first, truncated to `limit`
    /// (default 10).
    pub async fn upcoming(
        &self,
        today: NaiveDate,
        filter: SchedulerFilter,
        limit: Option<i64>,
    ) -> Result<Vec<MaintenanceJob>, UpkeepError> {
        let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT).max(0);
        jobs::list_upcoming(&self.db, today, filter, limit).await
    }

    /// Open (non-completed) job counts per property.
    pub async fn open_counts_by_property(&self) -> Result<Vec<PropertyOpenCount>, UpkeepError> {
        let counts = jobs::open_counts_by_property(&self.db).await?;
        Ok(counts
            .into_iter()
            .map(|(property_id, open_jobs)| PropertyOpenCount { property_id, open_jobs })
            .collect())
    }

    /// The filtered maintenance history, newest first, with status tallies
    /// computed over the same filtered set.
    pub async fn log(&self, filter: SchedulerFilter) -> Result<MaintenanceLog, UpkeepError> {
        let jobs = jobs::list_jobs(&self.db, filter).await?;
        let mut counts = StatusCounts::default();
        for job in &jobs {
            counts.record(job.status);
        }
        Ok(MaintenanceLog {
            jobs,
            stats: counts.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use tempfile::tempdir;
    use upkeep_core::types::{JobStatus, Priority, StatusFilter};
    use upkeep_storage::JobRecord;

    async fn setup_db() -> (Database, ScheduleViews, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("views.db").to_str().unwrap())
            .await
            .unwrap();
        let views = ScheduleViews::new(db.clone());
        (db, views, dir)
    }

    async fn seed_job(db: &Database, property_id: i64, date: &str) -> MaintenanceJob {
        jobs::create_job(
            db,
            JobRecord {
                property_id,
                property_name: format!("Property {property_id}"),
                property_location: None,
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                job_type: "Plumbing".into(),
                vendor_id: None,
                vendor_name: "Not assigned".into(),
                requested_time: "09:00".into(),
                priority: Priority::Normal,
                description: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn job_lands_in_its_civil_date_cell() {
        let (db, views, _dir) = setup_db().await;
        seed_job(&db, 1, "2025-03-10").await;

        let month = views
            .calendar_month(2025, 3, SchedulerFilter::default())
            .await
            .unwrap();
        assert_eq!(month.cells.len(), GRID_CELLS);

        let cell = month
            .cells
            .iter()
            .find(|c| c.date == NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            .unwrap();
        assert!(cell.in_month);
        assert_eq!(cell.jobs.len(), 1);
        assert_eq!(cell.jobs[0].job_type, "Plumbing");
        assert_eq!(cell.counts.pending, 1);

        // No other cell carries the job.
        let total: usize = month.cells.iter().map(|c| c.jobs.len()).sum();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn padding_cells_stay_empty() {
        let (db, views, _dir) = setup_db().await;
        // Feb 23 2025 is the first padding cell of the March 2025 grid.
        seed_job(&db, 1, "2025-02-23").await;

        let month = views
            .calendar_month(2025, 3, SchedulerFilter::default())
            .await
            .unwrap();
        let first = &month.cells[0];
        assert!(!first.in_month);
        assert!(first.jobs.is_empty());
        assert_eq!(first.counts.total(), 0);
    }

    #[tokio::test]
    async fn calendar_respects_status_filter() {
        let (db, views, _dir) = setup_db().await;
        let job = seed_job(&db, 1, "2025-03-10").await;
        seed_job(&db, 1, "2025-03-10").await;
        jobs::transition_status(&db, job.id, JobStatus::Completed, "12:00".into())
            .await
            .unwrap();

        let filter = SchedulerFilter {
            status: StatusFilter::Only(JobStatus::Pending),
            ..SchedulerFilter::default()
        };
        let month = views.calendar_month(2025, 3, filter).await.unwrap();
        let cell = month
            .cells
            .iter()
            .find(|c| c.date.day() == 10 && c.in_month)
            .unwrap();
        assert_eq!(cell.jobs.len(), 1);
        assert_eq!(cell.jobs[0].status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn upcoming_defaults_to_ten_soonest() {
        let (db, views, _dir) = setup_db().await;
        for day in 1..=12 {
            seed_job(&db, 1, &format!("2025-07-{day:02}")).await;
        }
        seed_job(&db, 1, "2025-06-30").await; // in the past

        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let upcoming = views
            .upcoming(today, SchedulerFilter::default(), None)
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 10);
        assert_eq!(upcoming[0].date.to_string(), "2025-07-01");
        assert_eq!(upcoming[9].date.to_string(), "2025-07-10");
    }

    #[tokio::test]
    async fn log_tallies_match_the_filtered_set() {
        let (db, views, _dir) = setup_db().await;
        let j1 = seed_job(&db, 1, "2025-05-01").await;
        let j2 = seed_job(&db, 2, "2025-05-02").await;
        seed_job(&db, 1, "2025-05-03").await;
        jobs::transition_status(&db, j1.id, JobStatus::Completed, "12:00".into())
            .await
            .unwrap();
        jobs::transition_status(&db, j2.id, JobStatus::Ongoing, "12:00".into())
            .await
            .unwrap();

        let log = views.log(SchedulerFilter::default()).await.unwrap();
        assert_eq!(log.stats.total, 3);
        assert_eq!(log.stats.completed, 1);
        assert_eq!(log.stats.ongoing, 1);
        assert_eq!(log.stats.pending, 1);
        // Newest first.
        assert_eq!(log.jobs[0].date.to_string(), "2025-05-03");

        let filtered = views
            .log(SchedulerFilter {
                property_id: Some(1),
                ..SchedulerFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.stats.total, 2);
    }

    #[tokio::test]
    async fn open_counts_exclude_completed() {
        let (db, views, _dir) = setup_db().await;
        let j1 = seed_job(&db, 1, "2025-05-01").await;
        seed_job(&db, 1, "2025-05-02").await;
        seed_job(&db, 2, "2025-05-03").await;
        jobs::transition_status(&db, j1.id, JobStatus::Completed, "12:00".into())
            .await
            .unwrap();

        let counts = views.open_counts_by_property().await.unwrap();
        let by_id: HashMap<i64, i64> = counts
            .iter()
            .map(|c| (c.property_id, c.open_jobs))
            .collect();
        assert_eq!(by_id[&1], 1);
        assert_eq!(by_id[&2], 1);
    }
}
