// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maintenance job CRUD and status transitions.
//!
//! The `date` column holds civil-date text (`YYYY-MM-DD`); every comparison
//! here is lexical on that form, which equals chronological order. No
//! timestamp-with-offset ever enters date logic.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Row, params, params_from_iter};

use upkeep_core::types::{
    JobStatus, MaintenanceJob, SchedulerFilter, StatusCounts, StatusFilter,
};
use upkeep_core::UpkeepError;

use crate::database::Database;
use crate::models::JobRecord;
use crate::queries::acknowledgments::ledger_for_job;

pub(crate) const JOB_COLUMNS: &str = "id, property_id, property_name, property_location, date, \
     type, vendor_id, vendor_name, status, requested_time, start_time, end_time, description, \
     priority, created_at, updated_at";

/// Map a `maintenance_jobs` row (selected with [`JOB_COLUMNS`]) into the
/// domain type. The acknowledgment ledger is attached separately.
pub(crate) fn job_from_row(row: &Row<'_>) -> rusqlite::Result<MaintenanceJob> {
    let date_text: String = row.get(4)?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let status_text: String = row.get(8)?;
    let status: JobStatus = status_text.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let priority_text: String = row.get(13)?;
    let priority = priority_text.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(13, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(MaintenanceJob {
        id: row.get(0)?,
        property_id: row.get(1)?,
        property_name: row.get(2)?,
        property_location: row.get(3)?,
        date,
        job_type: row.get(5)?,
        vendor_id: row.get(6)?,
        vendor_name: row.get(7)?,
        status,
        requested_time: row.get(9)?,
        start_time: row.get(10)?,
        end_time: row.get(11)?,
        description: row.get(12)?,
        priority,
        acknowledgments: Default::default(),
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// Select one job by id and attach its ledger. `None` if absent.
pub(crate) fn select_job(
    conn: &rusqlite::Connection,
    id: i64,
) -> rusqlite::Result<Option<MaintenanceJob>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {JOB_COLUMNS} FROM maintenance_jobs WHERE id = ?1"
    ))?;
    let result = stmt.query_row(params![id], job_from_row);
    match result {
        Ok(mut job) => {
            job.acknowledgments = ledger_for_job(conn, id)?;
            Ok(Some(job))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Translate a [`SchedulerFilter`] into WHERE clauses and bind values.
fn filter_clauses(filter: &SchedulerFilter, clauses: &mut Vec<String>, binds: &mut Vec<Value>) {
    if let StatusFilter::Only(status) = filter.status {
        clauses.push("status = ?".to_string());
        binds.push(Value::Text(status.to_string()));
    }
    if let Some(property_id) = filter.property_id {
        clauses.push("property_id = ?".to_string());
        binds.push(Value::Integer(property_id));
    }
    if let Some(start) = filter.start_date {
        clauses.push("date >= ?".to_string());
        binds.push(Value::Text(start.to_string()));
    }
    if let Some(end) = filter.end_date {
        clauses.push("date <= ?".to_string());
        binds.push(Value::Text(end.to_string()));
    }
}

fn select_filtered(
    conn: &rusqlite::Connection,
    filter: &SchedulerFilter,
    order: &str,
    limit: Option<i64>,
) -> rusqlite::Result<Vec<MaintenanceJob>> {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    filter_clauses(filter, &mut clauses, &mut binds);

    let mut sql = format!("SELECT {JOB_COLUMNS} FROM maintenance_jobs");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(order);
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        binds.push(Value::Integer(limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(binds), job_from_row)?;
    let mut jobs = Vec::new();
    for row in rows {
        jobs.push(row?);
    }
    for job in &mut jobs {
        job.acknowledgments = ledger_for_job(conn, job.id)?;
    }
    Ok(jobs)
}

/// Insert a validated job record. Returns the created job with its assigned
/// identifier, `status = pending`, and an empty acknowledgment ledger.
pub async fn create_job(db: &Database, record: JobRecord) -> Result<MaintenanceJob, UpkeepError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO maintenance_jobs (
                     property_id, property_name, property_location, date, type,
                     vendor_id, vendor_name, status, requested_time, description, priority
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', ?8, ?9, ?10)",
                params![
                    record.property_id,
                    record.property_name,
                    record.property_location,
                    record.date.to_string(),
                    record.job_type,
                    record.vendor_id,
                    record.vendor_name,
                    record.requested_time,
                    record.description,
                    record.priority.to_string(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            let job = select_job(conn, id)?.ok_or_else(|| {
                tokio_rusqlite::Error::Other("inserted job vanished".into())
            })?;
            Ok(job)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one job with its ledger.
pub async fn get_job(db: &Database, id: i64) -> Result<Option<MaintenanceJob>, UpkeepError> {
    db.connection()
        .call(move |conn| Ok(select_job(conn, id)?))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Filtered listing, newest date first (id descending as tiebreak).
pub async fn list_jobs(
    db: &Database,
    filter: SchedulerFilter,
) -> Result<Vec<MaintenanceJob>, UpkeepError> {
    db.connection()
        .call(move |conn| Ok(select_filtered(conn, &filter, "date DESC, id DESC", None)?))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Jobs dated on or after `from` (civil comparison), passing `filter`,
/// ascending by (date, id), truncated to `limit`.
pub async fn list_upcoming(
    db: &Database,
    from: NaiveDate,
    filter: SchedulerFilter,
    limit: i64,
) -> Result<Vec<MaintenanceJob>, UpkeepError> {
    let mut filter = filter;
    // Tighten the range's lower bound instead of adding a separate clause.
    filter.start_date = Some(match filter.start_date {
        Some(start) if start > from => start,
        _ => from,
    });
    db.connection()
        .call(move |conn| {
            Ok(select_filtered(conn, &filter, "date ASC, id ASC", Some(limit))?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a status transition with its timestamp side effects, atomically.
///
/// Entering `ongoing` sets `start_time` to `now_hhmm` if unset; entering
/// `completed` sets `end_time` if unset; reverting to `pending` clears both.
/// The read-modify-write runs in one transaction on the single writer, so
/// concurrent transitions and acknowledgments cannot lose updates.
pub async fn transition_status(
    db: &Database,
    id: i64,
    new_status: JobStatus,
    now_hhmm: String,
) -> Result<MaintenanceJob, UpkeepError> {
    let result: Result<MaintenanceJob, UpkeepError> = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let current = {
                let mut stmt = tx.prepare(
                    "SELECT start_time, end_time FROM maintenance_jobs WHERE id = ?1",
                )?;
                stmt.query_row(params![id], |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                    ))
                })
            };
            let (start_time, end_time) = match current {
                Ok(times) => times,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Ok(Err(UpkeepError::NotFound { kind: "job", id }));
                }
                Err(e) => return Err(e.into()),
            };

            let (start_time, end_time) = match new_status {
                JobStatus::Ongoing => (start_time.or(Some(now_hhmm)), end_time),
                JobStatus::Completed => (start_time, end_time.or(Some(now_hhmm))),
                JobStatus::Pending => (None, None),
            };

            tx.execute(
                "UPDATE maintenance_jobs
                 SET status = ?1, start_time = ?2, end_time = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![new_status.to_string(), start_time, end_time, id],
            )?;

            let job = select_job(&tx, id)?
                .ok_or_else(|| tokio_rusqlite::Error::Other("updated job vanished".into()))?;
            tx.commit()?;
            Ok(Ok(job))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}

/// Delete a job; the acknowledgment ledger cascades with it.
pub async fn delete_job(db: &Database, id: i64) -> Result<(), UpkeepError> {
    let deleted: usize = db
        .connection()
        .call(move |conn| {
            Ok(conn.execute("DELETE FROM maintenance_jobs WHERE id = ?1", params![id])?)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(UpkeepError::NotFound { kind: "job", id });
    }
    Ok(())
}

/// Open (non-completed) job count per property id.
pub async fn open_counts_by_property(db: &Database) -> Result<Vec<(i64, i64)>, UpkeepError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT property_id, COUNT(*) FROM maintenance_jobs
                 WHERE status != 'completed' GROUP BY property_id",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut counts = Vec::new();
            for row in rows {
                counts.push(row?);
            }
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate per-status counts over the full job set.
pub async fn status_counts(db: &Database) -> Result<StatusCounts, UpkeepError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT status, COUNT(*) FROM maintenance_jobs GROUP BY status")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            let mut counts = StatusCounts::default();
            for row in rows {
                let (status_text, n) = row?;
                let status: JobStatus = status_text.parse().map_err(|e| {
                    tokio_rusqlite::Error::Other(Box::new(e))
                })?;
                match status {
                    JobStatus::Pending => counts.pending = n,
                    JobStatus::Ongoing => counts.ongoing = n,
                    JobStatus::Completed => counts.completed = n,
                }
            }
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
