// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Acknowledgment ledger persistence.
//!
//! One row per (job, acknowledger key). Acknowledgment is monotonic: once a
//! key's row carries `acknowledged = 1` its timestamp and name snapshot are
//! frozen; a repeat acknowledgment returns the original entry unchanged.

use std::collections::BTreeMap;

use rusqlite::params;

use upkeep_core::UpkeepError;
use upkeep_core::types::AcknowledgmentEntry;

use crate::database::Database;

/// Load the full ledger for one job, keyed by the wire form of the
/// acknowledger key (`"<id>"` or `"hr_<id>"`).
pub(crate) fn ledger_for_job(
    conn: &rusqlite::Connection,
    job_id: i64,
) -> rusqlite::Result<BTreeMap<String, AcknowledgmentEntry>> {
    let mut stmt = conn.prepare(
        "SELECT ack_key, acknowledged, timestamp, name
         FROM acknowledgments WHERE job_id = ?1",
    )?;
    let rows = stmt.query_map(params![job_id], |row| {
        let key: String = row.get(0)?;
        Ok((
            key,
            AcknowledgmentEntry {
                acknowledged: row.get::<_, i64>(1)? != 0,
                timestamp: row.get(2)?,
                name: row.get(3)?,
            },
        ))
    })?;
    let mut ledger = BTreeMap::new();
    for row in rows {
        let (key, entry) = row?;
        ledger.insert(key, entry);
    }
    Ok(ledger)
}

/// Record an acknowledgment for `key` on `job_id`, snapshotting `name`.
///
/// Idempotent: if the key is already acknowledged, the stored entry is
/// returned as-is and nothing is written. Runs in one transaction so a
/// concurrent job deletion cannot leave an orphan row.
pub async fn acknowledge(
    db: &Database,
    job_id: i64,
    key: String,
    name: String,
) -> Result<AcknowledgmentEntry, UpkeepError> {
    let result: Result<AcknowledgmentEntry, UpkeepError> = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let exists: bool = tx
                .prepare("SELECT 1 FROM maintenance_jobs WHERE id = ?1")?
                .exists(params![job_id])?;
            if !exists {
                return Ok(Err(UpkeepError::NotFound { kind: "job", id: job_id }));
            }

            let current = {
                let mut stmt = tx.prepare(
                    "SELECT acknowledged, timestamp, name FROM acknowledgments
                     WHERE job_id = ?1 AND ack_key = ?2",
                )?;
                stmt.query_row(params![job_id, key], |row| {
                    Ok(AcknowledgmentEntry {
                        acknowledged: row.get::<_, i64>(0)? != 0,
                        timestamp: row.get(1)?,
                        name: row.get(2)?,
                    })
                })
            };
            match current {
                Ok(entry) if entry.acknowledged => {
                    tx.commit()?;
                    return Ok(Ok(entry));
                }
                Ok(_) | Err(rusqlite::Error::QueryReturnedNoRows) => {}
                Err(e) => return Err(e.into()),
            }

            tx.execute(
                "INSERT INTO acknowledgments (job_id, ack_key, acknowledged, timestamp, name)
                 VALUES (?1, ?2, 1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), ?3)
                 ON CONFLICT (job_id, ack_key) DO UPDATE SET
                     acknowledged = 1,
                     timestamp = excluded.timestamp,
                     name = excluded.name",
                params![job_id, key, name],
            )?;
            tx.execute(
                "UPDATE maintenance_jobs
                 SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![job_id],
            )?;

            let entry = {
                let mut stmt = tx.prepare(
                    "SELECT acknowledged, timestamp, name FROM acknowledgments
                     WHERE job_id = ?1 AND ack_key = ?2",
                )?;
                stmt.query_row(params![job_id, key], |row| {
                    Ok(AcknowledgmentEntry {
                        acknowledged: row.get::<_, i64>(0)? != 0,
                        timestamp: row.get(1)?,
                        name: row.get(2)?,
                    })
                })?
            };
            tx.commit()?;
            Ok(Ok(entry))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}

/// The full ledger for a job. Errors with `NotFound` if the job is absent,
/// so callers can distinguish "no acknowledgments yet" from "no such job".
pub async fn ledger(
    db: &Database,
    job_id: i64,
) -> Result<BTreeMap<String, AcknowledgmentEntry>, UpkeepError> {
    let result: Result<BTreeMap<String, AcknowledgmentEntry>, UpkeepError> = db
        .connection()
        .call(move |conn| {
            let exists: bool = conn
                .prepare("SELECT 1 FROM maintenance_jobs WHERE id = ?1")?
                .exists(params![job_id])?;
            if !exists {
                return Ok(Err(UpkeepError::NotFound { kind: "job", id: job_id }));
            }
            Ok(Ok(ledger_for_job(conn, job_id)?))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::models::{JobRecord, Priority};
    use crate::queries::jobs;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    async fn setup_job() -> (Database, tempfile::TempDir, i64) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("ack.db").to_str().unwrap())
            .await
            .unwrap();
        let job = jobs::create_job(
            &db,
            JobRecord {
                property_id: 1,
                property_name: "Plaza".into(),
                property_location: None,
                date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                job_type: "Plumbing".into(),
                vendor_id: None,
                vendor_name: "Not assigned".into(),
                requested_time: "09:00".into(),
                priority: Priority::Normal,
                description: None,
            },
        )
        .await
        .unwrap();
        (db, dir, job.id)
    }

    #[tokio::test]
    async fn acknowledge_records_entry_with_timestamp() {
        let (db, _dir, job_id) = setup_job().await;
        let entry = acknowledge(&db, job_id, "7".into(), "Maria Santos".into())
            .await
            .unwrap();
        assert!(entry.acknowledged);
        assert!(entry.timestamp.is_some());
        assert_eq!(entry.name.as_deref(), Some("Maria Santos"));

        let job = jobs::get_job(&db, job_id).await.unwrap().unwrap();
        assert_eq!(job.acknowledgments.len(), 1);
        assert!(job.acknowledgments["7"].acknowledged);
    }

    #[tokio::test]
    async fn repeat_acknowledgment_keeps_original_entry() {
        let (db, _dir, job_id) = setup_job().await;
        let first = acknowledge(&db, job_id, "7".into(), "Maria Santos".into())
            .await
            .unwrap();
        let second = acknowledge(&db, job_id, "7".into(), "Someone Else".into())
            .await
            .unwrap();
        assert_eq!(second.timestamp, first.timestamp);
        assert_eq!(second.name.as_deref(), Some("Maria Santos"));
    }

    #[tokio::test]
    async fn hr_and_general_keys_are_distinct_entries() {
        let (db, _dir, job_id) = setup_job().await;
        acknowledge(&db, job_id, "7".into(), "Maria Santos".into())
            .await
            .unwrap();
        acknowledge(&db, job_id, "hr_7".into(), "Maria Santos".into())
            .await
            .unwrap();
        let entries = ledger(&db, job_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains_key("7"));
        assert!(entries.contains_key("hr_7"));
    }

    #[tokio::test]
    async fn acknowledge_missing_job_is_not_found() {
        let (db, _dir, _job_id) = setup_job().await;
        let err = acknowledge(&db, 999, "7".into(), "Maria".into())
            .await
            .unwrap_err();
        assert!(matches!(err, UpkeepError::NotFound { kind: "job", id: 999 }));
    }

    #[tokio::test]
    async fn ledger_distinguishes_empty_from_missing() {
        let (db, _dir, job_id) = setup_job().await;
        assert!(ledger(&db, job_id).await.unwrap().is_empty());
        assert!(matches!(
            ledger(&db, 999).await.unwrap_err(),
            UpkeepError::NotFound { kind: "job", .. }
        ));
    }

    #[tokio::test]
    async fn ledger_cascades_with_job_deletion() {
        let (db, _dir, job_id) = setup_job().await;
        acknowledge(&db, job_id, "7".into(), "Maria".into())
            .await
            .unwrap();
        jobs::delete_job(&db, job_id).await.unwrap();

        let orphans: i64 = db
            .connection()
            .call(move |conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM acknowledgments WHERE job_id = ?1",
                    params![job_id],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
