// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The maintenance scheduling engine.
//!
//! Validates incoming requests against the Property Registry and the
//! Vendor/Personnel Directory, snapshots names at creation time, and applies
//! status transitions and acknowledgments through the single-writer store.
//! The engine fails closed: if a directory lookup errors, the write is
//! rejected rather than recorded with unresolved references.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveTime};

use upkeep_core::types::{
    AcknowledgerKey, AcknowledgmentEntry, JobStatus, MaintenanceJob, NewJob, Personnel,
    SchedulerFilter,
};
use upkeep_core::{PropertyRegistry, StaffDirectory, UpkeepError};
use upkeep_storage::{Database, JobRecord};
use upkeep_storage::queries::{acknowledgments, jobs};

/// Acknowledgment state of one job, paired with the roster of HR personnel
/// eligible to acknowledge in HR capacity.
#[derive(Debug, Clone)]
pub struct AcknowledgmentView {
    pub entries: BTreeMap<String, AcknowledgmentEntry>,
    pub hr_roster: Vec<Personnel>,
}

/// Coordinates validation, directory resolution, and persistence.
#[derive(Clone)]
pub struct MaintenanceEngine {
    db: Database,
    registry: Arc<dyn PropertyRegistry>,
    directory: Arc<dyn StaffDirectory>,
}

impl MaintenanceEngine {
    pub fn new(
        db: Database,
        registry: Arc<dyn PropertyRegistry>,
        directory: Arc<dyn StaffDirectory>,
    ) -> Self {
        Self {
            db,
            registry,
            directory,
        }
    }

    /// Schedule a new maintenance job.
    ///
    /// Every missing required field is reported in one validation error, not
    /// just the first. The property (and vendor, if referenced) must resolve
    /// through the directories; their names are snapshotted onto the job and
    /// never re-joined afterwards.
    pub async fn schedule_job(&self, input: NewJob) -> Result<MaintenanceJob, UpkeepError> {
        let mut missing = Vec::new();
        if input.property_id.is_none() {
            missing.push("property_id".to_string());
        }
        if input.date.as_deref().is_none_or(str::is_empty) {
            missing.push("date".to_string());
        }
        if input.job_type.as_deref().is_none_or(str::is_empty) {
            missing.push("type".to_string());
        }
        if input.requested_time.as_deref().is_none_or(str::is_empty) {
            missing.push("requested_time".to_string());
        }
        if !missing.is_empty() {
            return Err(UpkeepError::missing_fields(missing));
        }

        let property_id = input.property_id.unwrap_or_default();
        let date_text = input.date.unwrap_or_default();
        let job_type = input.job_type.unwrap_or_default();
        let requested_time = input.requested_time.unwrap_or_default();

        let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|_| {
            UpkeepError::invalid_field("date", format!("`{date_text}` is not a YYYY-MM-DD date"))
        })?;
        NaiveTime::parse_from_str(&requested_time, "%H:%M").map_err(|_| {
            UpkeepError::invalid_field(
                "requested_time",
                format!("`{requested_time}` is not an HH:MM time"),
            )
        })?;

        let property = self
            .registry
            .get_property(property_id)
            .await?
            .ok_or_else(|| {
                UpkeepError::invalid_field(
                    "property_id",
                    format!("unknown property id {property_id}"),
                )
            })?;

        let (vendor_id, vendor_name) = match input.vendor_id {
            Some(vendor_id) => {
                let vendor = self.directory.get_vendor(vendor_id).await?.ok_or_else(|| {
                    UpkeepError::invalid_field(
                        "vendor_id",
                        format!("unknown vendor id {vendor_id}"),
                    )
                })?;
                (Some(vendor.id), vendor.name)
            }
            None => (None, "Not assigned".to_string()),
        };

        let record = JobRecord {
            property_id: property.id,
            property_name: property.name,
            property_location: Some(property.location),
            date,
            job_type,
            vendor_id,
            vendor_name,
            requested_time,
            priority: input.priority,
            description: input.description,
        };
        let job = jobs::create_job(&self.db, record).await?;
        tracing::info!(
            job_id = job.id,
            property_id = job.property_id,
            date = %job.date,
            "maintenance job scheduled"
        );
        Ok(job)
    }

    /// Apply a status transition named by its wire form.
    ///
    /// First entry into `ongoing` stamps `start_time` with the current local
    /// wall-clock time; first entry into `completed` stamps `end_time`;
    /// reverting to `pending` clears both.
    pub async fn set_status(
        &self,
        job_id: i64,
        status_text: &str,
    ) -> Result<MaintenanceJob, UpkeepError> {
        let status: JobStatus = status_text.parse().map_err(|_| {
            UpkeepError::invalid_field("status", format!("unrecognized status `{status_text}`"))
        })?;
        let now = Local::now().format("%H:%M").to_string();
        let job = jobs::transition_status(&self.db, job_id, status, now).await?;
        tracing::info!(job_id, status = %status, "status transition applied");
        Ok(job)
    }

    /// Record an acknowledgment under `key`.
    ///
    /// The acknowledger's display name is snapshotted from the directory at
    /// this moment; an unresolvable personnel id acknowledges as "Unknown"
    /// rather than failing, since the acknowledgment itself is the record
    /// that matters. Idempotent per key.
    pub async fn acknowledge(
        &self,
        job_id: i64,
        key: AcknowledgerKey,
    ) -> Result<AcknowledgmentEntry, UpkeepError> {
        let name = self
            .directory
            .get_personnel(key.personnel_id())
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| "Unknown".to_string());
        let entry = acknowledgments::acknowledge(&self.db, job_id, key.to_string(), name).await?;
        tracing::info!(job_id, key = %key, "acknowledgment recorded");
        Ok(entry)
    }

    /// The acknowledgment ledger for a job plus the eligible HR roster.
    pub async fn acknowledgment_view(
        &self,
        job_id: i64,
    ) -> Result<AcknowledgmentView, UpkeepError> {
        let entries = acknowledgments::ledger(&self.db, job_id).await?;
        let hr_roster = self.directory.list_personnel(Some("HR")).await?;
        Ok(AcknowledgmentView { entries, hr_roster })
    }

    pub async fn get_job(&self, job_id: i64) -> Result<MaintenanceJob, UpkeepError> {
        jobs::get_job(&self.db, job_id)
            .await?
            .ok_or(UpkeepError::NotFound { kind: "job", id: job_id })
    }

    pub async fn list_jobs(
        &self,
        filter: SchedulerFilter,
    ) -> Result<Vec<MaintenanceJob>, UpkeepError> {
        jobs::list_jobs(&self.db, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use upkeep_storage::SqliteDirectory;
    use upkeep_storage::queries::{directory, properties};

    struct Harness {
        engine: MaintenanceEngine,
        db: Database,
        _dir: tempfile::TempDir,
    }

    async fn setup() -> Harness {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("engine.db").to_str().unwrap())
            .await
            .unwrap();
        let adapter = Arc::new(SqliteDirectory::new(db.clone()));
        let engine = MaintenanceEngine::new(db.clone(), adapter.clone(), adapter);
        Harness { engine, db, _dir: dir }
    }

    async fn seed_property(h: &Harness) -> i64 {
        properties::create_property(&h.db, "Grand Plaza".into(), "Downtown".into(), None)
            .await
            .unwrap()
            .id
    }

    fn valid_input(property_id: i64) -> NewJob {
        NewJob {
            property_id: Some(property_id),
            date: Some("2025-03-10".into()),
            job_type: Some("Electrical".into()),
            requested_time: Some("09:00".into()),
            ..NewJob::default()
        }
    }

    #[tokio::test]
    async fn schedule_reports_all_missing_fields_at_once() {
        let h = setup().await;
        let err = h.engine.schedule_job(NewJob::default()).await.unwrap_err();
        let UpkeepError::Validation { fields, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields, vec!["property_id", "date", "type", "requested_time"]);
    }

    #[tokio::test]
    async fn schedule_rejects_malformed_date_and_time() {
        let h = setup().await;
        let property_id = seed_property(&h).await;

        let mut input = valid_input(property_id);
        input.date = Some("03/10/2025".into());
        let err = h.engine.schedule_job(input).await.unwrap_err();
        assert!(matches!(err, UpkeepError::Validation { ref fields, .. } if fields == &["date"]));

        let mut input = valid_input(property_id);
        input.requested_time = Some("9am".into());
        let err = h.engine.schedule_job(input).await.unwrap_err();
        assert!(
            matches!(err, UpkeepError::Validation { ref fields, .. } if fields == &["requested_time"])
        );
    }

    #[tokio::test]
    async fn schedule_rejects_unknown_property() {
        let h = setup().await;
        let err = h.engine.schedule_job(valid_input(999)).await.unwrap_err();
        assert!(
            matches!(err, UpkeepError::Validation { ref fields, .. } if fields == &["property_id"])
        );
    }

    #[tokio::test]
    async fn schedule_snapshots_property_and_defaults_vendor() {
        let h = setup().await;
        let property_id = seed_property(&h).await;
        let job = h.engine.schedule_job(valid_input(property_id)).await.unwrap();

        assert_eq!(job.property_name, "Grand Plaza");
        assert_eq!(job.property_location.as_deref(), Some("Downtown"));
        assert_eq!(job.vendor_name, "Not assigned");
        assert_eq!(job.status, JobStatus::Pending);

        // The snapshot survives property deletion (cascade clears the open
        // job too, so complete it first).
        h.engine
            .set_status(job.id, "completed")
            .await
            .unwrap();
        properties::delete_property(&h.db, property_id, false)
            .await
            .unwrap();
        let fetched = h.engine.get_job(job.id).await.unwrap();
        assert_eq!(fetched.property_name, "Grand Plaza");
    }

    #[tokio::test]
    async fn schedule_resolves_vendor_name() {
        let h = setup().await;
        let property_id = seed_property(&h).await;
        let vendor = directory::create_vendor(&h.db, "Sparks Co".into(), "Electrical".into())
            .await
            .unwrap();

        let mut input = valid_input(property_id);
        input.vendor_id = Some(vendor.id);
        let job = h.engine.schedule_job(input).await.unwrap();
        assert_eq!(job.vendor_id, Some(vendor.id));
        assert_eq!(job.vendor_name, "Sparks Co");

        let mut input = valid_input(property_id);
        input.vendor_id = Some(999);
        let err = h.engine.schedule_job(input).await.unwrap_err();
        assert!(
            matches!(err, UpkeepError::Validation { ref fields, .. } if fields == &["vendor_id"])
        );
    }

    #[tokio::test]
    async fn set_status_rejects_unknown_status_text() {
        let h = setup().await;
        let property_id = seed_property(&h).await;
        let job = h.engine.schedule_job(valid_input(property_id)).await.unwrap();

        let err = h.engine.set_status(job.id, "done").await.unwrap_err();
        assert!(matches!(err, UpkeepError::Validation { ref fields, .. } if fields == &["status"]));

        let ongoing = h.engine.set_status(job.id, "ongoing").await.unwrap();
        assert_eq!(ongoing.status, JobStatus::Ongoing);
        assert!(ongoing.start_time.is_some());
    }

    #[tokio::test]
    async fn acknowledge_snapshots_directory_name() {
        let h = setup().await;
        let property_id = seed_property(&h).await;
        let job = h.engine.schedule_job(valid_input(property_id)).await.unwrap();
        let person = directory::create_personnel(
            &h.db,
            "Maria Santos".into(),
            "maria@example.com".into(),
            "HR".into(),
            None,
            None,
        )
        .await
        .unwrap();

        let entry = h
            .engine
            .acknowledge(job.id, AcknowledgerKey::new(person.id, true))
            .await
            .unwrap();
        assert!(entry.acknowledged);
        assert_eq!(entry.name.as_deref(), Some("Maria Santos"));

        let view = h.engine.acknowledgment_view(job.id).await.unwrap();
        assert!(view.entries.contains_key(&format!("hr_{}", person.id)));
        assert_eq!(view.hr_roster.len(), 1);
    }

    #[tokio::test]
    async fn acknowledge_unknown_personnel_uses_fallback_name() {
        let h = setup().await;
        let property_id = seed_property(&h).await;
        let job = h.engine.schedule_job(valid_input(property_id)).await.unwrap();

        let entry = h
            .engine
            .acknowledge(job.id, AcknowledgerKey::new(42, false))
            .await
            .unwrap();
        assert!(entry.acknowledged);
        assert_eq!(entry.name.as_deref(), Some("Unknown"));
    }

    #[tokio::test]
    async fn acknowledge_is_idempotent_through_the_engine() {
        let h = setup().await;
        let property_id = seed_property(&h).await;
        let job = h.engine.schedule_job(valid_input(property_id)).await.unwrap();
        let key = AcknowledgerKey::new(7, false);

        let first = h.engine.acknowledge(job.id, key).await.unwrap();
        let second = h.engine.acknowledge(job.id, key).await.unwrap();
        assert_eq!(first, second);

        let fetched = h.engine.get_job(job.id).await.unwrap();
        assert_eq!(fetched.acknowledgments.len(), 1);
    }
}
