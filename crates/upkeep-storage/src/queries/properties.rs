// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property registry persistence.
//!
//! The `maintenance_count` and `personnel_count` columns of [`Property`] are
//! derived at query time from the live job and assignment sets; nothing here
//! stores a counter.

use rusqlite::{Row, params};

use upkeep_core::UpkeepError;
use upkeep_core::types::Property;

use crate::database::Database;

const PROPERTY_SELECT: &str = "SELECT p.id, p.name, p.location, p.description,
        (SELECT COUNT(*) FROM maintenance_jobs m
           WHERE m.property_id = p.id AND m.status != 'completed'),
        (SELECT COUNT(*) FROM property_personnel pp WHERE pp.property_id = p.id)
     FROM properties p";

fn property_from_row(row: &Row<'_>) -> rusqlite::Result<Property> {
    Ok(Property {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        maintenance_count: row.get(4)?,
        personnel_count: row.get(5)?,
    })
}

/// Register a property. Counters start at zero by construction.
pub async fn create_property(
    db: &Database,
    name: String,
    location: String,
    description: Option<String>,
) -> Result<Property, UpkeepError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO properties (name, location, description) VALUES (?1, ?2, ?3)",
                params![name, location, description],
            )?;
            let id = conn.last_insert_rowid();
            let property = conn.query_row(
                &format!("{PROPERTY_SELECT} WHERE p.id = ?1"),
                params![id],
                property_from_row,
            )?;
            Ok(property)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_property(db: &Database, id: i64) -> Result<Option<Property>, UpkeepError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("{PROPERTY_SELECT} WHERE p.id = ?1"),
                params![id],
                property_from_row,
            );
            match result {
                Ok(property) => Ok(Some(property)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All properties, name order, with live derived counters.
pub async fn list_properties(db: &Database) -> Result<Vec<Property>, UpkeepError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!("{PROPERTY_SELECT} ORDER BY p.name ASC"))?;
            let rows = stmt.query_map([], property_from_row)?;
            let mut properties = Vec::new();
            for row in rows {
                properties.push(row?);
            }
            Ok(properties)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a property.
///
/// Rejected with a validation error while open (non-completed) jobs still
/// reference it, unless `cascade` is set, in which case all referencing jobs
/// (and their ledgers) go down with it in the same transaction.
pub async fn delete_property(db: &Database, id: i64, cascade: bool) -> Result<(), UpkeepError> {
    let result: Result<(), UpkeepError> = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let exists: bool = tx
                .prepare("SELECT 1 FROM properties WHERE id = ?1")?
                .exists(params![id])?;
            if !exists {
                return Ok(Err(UpkeepError::NotFound { kind: "property", id }));
            }

            let open_jobs: i64 = tx.query_row(
                "SELECT COUNT(*) FROM maintenance_jobs
                 WHERE property_id = ?1 AND status != 'completed'",
                params![id],
                |row| row.get(0),
            )?;
            if open_jobs > 0 && !cascade {
                return Ok(Err(UpkeepError::invalid_field(
                    "cascade",
                    format!("property {id} has {open_jobs} open maintenance job(s)"),
                )));
            }
            if cascade {
                tx.execute(
                    "DELETE FROM maintenance_jobs WHERE property_id = ?1",
                    params![id],
                )?;
            }
            tx.execute("DELETE FROM properties WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(Ok(()))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}

/// Assign a staff member to a property. Idempotent.
pub async fn assign_personnel(
    db: &Database,
    property_id: i64,
    personnel_id: i64,
) -> Result<(), UpkeepError> {
    let result: Result<(), UpkeepError> = db
        .connection()
        .call(move |conn| {
            let property_exists: bool = conn
                .prepare("SELECT 1 FROM properties WHERE id = ?1")?
                .exists(params![property_id])?;
            if !property_exists {
                return Ok(Err(UpkeepError::NotFound {
                    kind: "property",
                    id: property_id,
                }));
            }
            let personnel_exists: bool = conn
                .prepare("SELECT 1 FROM personnel WHERE id = ?1")?
                .exists(params![personnel_id])?;
            if !personnel_exists {
                return Ok(Err(UpkeepError::NotFound {
                    kind: "personnel",
                    id: personnel_id,
                }));
            }
            conn.execute(
                "INSERT OR IGNORE INTO property_personnel (property_id, personnel_id)
                 VALUES (?1, ?2)",
                params![property_id, personnel_id],
            )?;
            Ok(Ok(()))
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
    use crate::queries::{directory, jobs};
    use chrono::NaiveDate;
    use tempfile::tempdir;
    use upkeep_core::types::JobStatus;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("props.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    fn record_for(property: &Property, date: &str) -> JobRecord {
        JobRecord {
            property_id: property.id,
            property_name: property.name.clone(),
            property_location: Some(property.location.clone()),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            job_type: "HVAC".into(),
            vendor_id: None,
            vendor_name: "Not assigned".into(),
            requested_time: "08:00".into(),
            priority: Priority::Normal,
            description: None,
        }
    }

    #[tokio::test]
    async fn created_property_starts_with_zero_counters() {
        let (db, _dir) = setup_db().await;
        let property = create_property(&db, "Plaza".into(), "Downtown".into(), None)
            .await
            .unwrap();
        assert!(property.id > 0);
        assert_eq!(property.maintenance_count, 0);
        assert_eq!(property.personnel_count, 0);
    }

    #[tokio::test]
    async fn maintenance_count_tracks_open_jobs_only() {
        let (db, _dir) = setup_db().await;
        let property = create_property(&db, "Plaza".into(), "Downtown".into(), None)
            .await
            .unwrap();
        let j1 = jobs::create_job(&db, record_for(&property, "2025-05-01"))
            .await
            .unwrap();
        jobs::create_job(&db, record_for(&property, "2025-05-02"))
            .await
            .unwrap();
        jobs::transition_status(&db, j1.id, JobStatus::Completed, "12:00".into())
            .await
            .unwrap();

        let fetched = get_property(&db, property.id).await.unwrap().unwrap();
        assert_eq!(fetched.maintenance_count, 1);
    }

    #[tokio::test]
    async fn personnel_count_tracks_assignments() {
        let (db, _dir) = setup_db().await;
        let property = create_property(&db, "Plaza".into(), "Downtown".into(), None)
            .await
            .unwrap();
        let person = directory::create_personnel(
            &db,
            "Maria Santos".into(),
            "maria@example.com".into(),
            "Technician".into(),
            None,
            None,
        )
        .await
        .unwrap();

        assign_personnel(&db, property.id, person.id).await.unwrap();
        // Assignment is idempotent.
        assign_personnel(&db, property.id, person.id).await.unwrap();

        let fetched = get_property(&db, property.id).await.unwrap().unwrap();
        assert_eq!(fetched.personnel_count, 1);
    }

    #[tokio::test]
    async fn delete_rejects_while_open_jobs_reference_it() {
        let (db, _dir) = setup_db().await;
        let property = create_property(&db, "Plaza".into(), "Downtown".into(), None)
            .await
            .unwrap();
        jobs::create_job(&db, record_for(&property, "2025-05-01"))
            .await
            .unwrap();

        let err = delete_property(&db, property.id, false).await.unwrap_err();
        assert!(matches!(err, UpkeepError::Validation { .. }));
        assert!(get_property(&db, property.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_cascade_removes_property_and_jobs() {
        let (db, _dir) = setup_db().await;
        let property = create_property(&db, "Plaza".into(), "Downtown".into(), None)
            .await
            .unwrap();
        let job = jobs::create_job(&db, record_for(&property, "2025-05-01"))
            .await
            .unwrap();

        delete_property(&db, property.id, true).await.unwrap();
        assert!(get_property(&db, property.id).await.unwrap().is_none());
        assert!(jobs::get_job(&db, job.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_with_only_completed_jobs_needs_no_cascade() {
        let (db, _dir) = setup_db().await;
        let property = create_property(&db, "Plaza".into(), "Downtown".into(), None)
            .await
            .unwrap();
        let job = jobs::create_job(&db, record_for(&property, "2025-05-01"))
            .await
            .unwrap();
        jobs::transition_status(&db, job.id, JobStatus::Completed, "12:00".into())
            .await
            .unwrap();

        delete_property(&db, property.id, false).await.unwrap();
        assert!(get_property(&db, property.id).await.unwrap().is_none());
        // Completed history survives a non-cascade delete.
        assert!(jobs::get_job(&db, job.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_missing_property_is_not_found() {
        let (db, _dir) = setup_db().await;
        assert!(matches!(
            delete_property(&db, 404, false).await.unwrap_err(),
            UpkeepError::NotFound { kind: "property", .. }
        ));
    }
}
