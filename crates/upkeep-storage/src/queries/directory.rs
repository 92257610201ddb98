// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vendor and personnel directory persistence.

use rusqlite::{Row, params};

use upkeep_core::UpkeepError;
use upkeep_core::types::{Personnel, Vendor};

use crate::database::Database;

const VENDOR_COLUMNS: &str = "id, name, category, rating, active_contracts, performance";
const PERSONNEL_COLUMNS: &str = "id, name, email, role, location, shift, status";

fn vendor_from_row(row: &Row<'_>) -> rusqlite::Result<Vendor> {
    Ok(Vendor {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        rating: row.get(3)?,
        active_contracts: row.get(4)?,
        performance: row.get(5)?,
    })
}

fn personnel_from_row(row: &Row<'_>) -> rusqlite::Result<Personnel> {
    Ok(Personnel {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        location: row.get(4)?,
        shift: row.get(5)?,
        status: row.get(6)?,
    })
}

pub async fn create_vendor(
    db: &Database,
    name: String,
    category: String,
) -> Result<Vendor, UpkeepError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO vendors (name, category) VALUES (?1, ?2)",
                params![name, category],
            )?;
            let id = conn.last_insert_rowid();
            let vendor = conn.query_row(
                &format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = ?1"),
                params![id],
                vendor_from_row,
            )?;
            Ok(vendor)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_vendor(db: &Database, id: i64) -> Result<Option<Vendor>, UpkeepError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = ?1"),
                params![id],
                vendor_from_row,
            );
            match result {
                Ok(vendor) => Ok(Some(vendor)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Vendors in name order, optionally narrowed to one category.
pub async fn list_vendors(
    db: &Database,
    category: Option<String>,
) -> Result<Vec<Vendor>, UpkeepError> {
    db.connection()
        .call(move |conn| {
            let mut vendors = Vec::new();
            match category {
                Some(category) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {VENDOR_COLUMNS} FROM vendors WHERE category = ?1 ORDER BY name ASC"
                    ))?;
                    let rows = stmt.query_map(params![category], vendor_from_row)?;
                    for row in rows {
                        vendors.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY name ASC"
                    ))?;
                    let rows = stmt.query_map([], vendor_from_row)?;
                    for row in rows {
                        vendors.push(row?);
                    }
                }
            }
            Ok(vendors)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn create_personnel(
    db: &Database,
    name: String,
    email: String,
    role: String,
    location: Option<String>,
    shift: Option<String>,
) -> Result<Personnel, UpkeepError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO personnel (name, email, role, location, shift)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, email, role, location, shift],
            )?;
            let id = conn.last_insert_rowid();
            let person = conn.query_row(
                &format!("SELECT {PERSONNEL_COLUMNS} FROM personnel WHERE id = ?1"),
                params![id],
                personnel_from_row,
            )?;
            Ok(person)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_personnel(db: &Database, id: i64) -> Result<Option<Personnel>, UpkeepError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {PERSONNEL_COLUMNS} FROM personnel WHERE id = ?1"),
                params![id],
                personnel_from_row,
            );
            match result {
                Ok(person) => Ok(Some(person)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Personnel in name order, optionally narrowed to one role (exact match,
/// e.g. `"HR"` for the HR acknowledgment roster).
pub async fn list_personnel(
    db: &Database,
    role: Option<String>,
) -> Result<Vec<Personnel>, UpkeepError> {
    db.connection()
        .call(move |conn| {
            let mut people = Vec::new();
            match role {
                Some(role) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {PERSONNEL_COLUMNS} FROM personnel WHERE role = ?1 ORDER BY name ASC"
                    ))?;
                    let rows = stmt.query_map(params![role], personnel_from_row)?;
                    for row in rows {
                        people.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {PERSONNEL_COLUMNS} FROM personnel ORDER BY name ASC"
                    ))?;
                    let rows = stmt.query_map([], personnel_from_row)?;
                    for row in rows {
                        people.push(row?);
                    }
                }
            }
            Ok(people)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("dir.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn vendor_round_trip_and_category_filter() {
        let (db, _dir) = setup_db().await;
        let electric = create_vendor(&db, "Sparks Co".into(), "Electrical".into())
            .await
            .unwrap();
        create_vendor(&db, "Pipes Inc".into(), "Plumbing".into())
            .await
            .unwrap();

        let fetched = get_vendor(&db, electric.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Sparks Co");
        assert_eq!(fetched.rating, 0.0);

        let electrical = list_vendors(&db, Some("Electrical".into())).await.unwrap();
        assert_eq!(electrical.len(), 1);
        assert_eq!(list_vendors(&db, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn personnel_role_filter_selects_hr_roster() {
        let (db, _dir) = setup_db().await;
        create_personnel(
            &db,
            "Maria Santos".into(),
            "maria@example.com".into(),
            "HR".into(),
            None,
            None,
        )
        .await
        .unwrap();
        create_personnel(
            &db,
            "Ben Okafor".into(),
            "ben@example.com".into(),
            "Technician".into(),
            Some("Downtown".into()),
            Some("Day".into()),
        )
        .await
        .unwrap();

        let hr = list_personnel(&db, Some("HR".into())).await.unwrap();
        assert_eq!(hr.len(), 1);
        assert_eq!(hr[0].name, "Maria Santos");
        assert_eq!(hr[0].status, "active");

        assert!(get_personnel(&db, 999).await.unwrap().is_none());
    }
}
