// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for the maintenance scheduling engine.
//!
//! All date fields are civil calendar dates (`NaiveDate`): scheduling and
//! bucketing math operates on year/month/day components only, never on a
//! timezone-aware instant, so a job dated `2025-03-10` lands in the March 10
//! bucket regardless of the server's timezone offset.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::UpkeepError;

/// Lifecycle state of a maintenance job.
///
/// `pending` is the initial state. Transitions are allowed from any state to
/// any other; the semantic effects on `start_time`/`end_time` live in the
/// scheduling engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Ongoing,
    Completed,
}

/// Priority of a maintenance job. Wire form is capitalized (`Normal`/`Urgent`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
}

/// Key into a job's acknowledgment ledger.
///
/// A person may acknowledge a job in a general capacity or in an HR capacity;
/// the two are tracked under distinct keys in the same ledger. The wire form
/// is `"<id>"` for general and `"hr_<id>"` for HR, preserving the original
/// external format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcknowledgerKey {
    Personnel(i64),
    Hr(i64),
}

impl AcknowledgerKey {
    /// Build the key for a personnel id, HR-scoped or general.
    pub fn new(personnel_id: i64, as_hr: bool) -> Self {
        if as_hr {
            AcknowledgerKey::Hr(personnel_id)
        } else {
            AcknowledgerKey::Personnel(personnel_id)
        }
    }

    /// The personnel id behind this key, regardless of capacity.
    pub fn personnel_id(&self) -> i64 {
        match self {
            AcknowledgerKey::Personnel(id) | AcknowledgerKey::Hr(id) => *id,
        }
    }
}

impl fmt::Display for AcknowledgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcknowledgerKey::Personnel(id) => write!(f, "{id}"),
            AcknowledgerKey::Hr(id) => write!(f, "hr_{id}"),
        }
    }
}

impl FromStr for AcknowledgerKey {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (as_hr, raw) = match s.strip_prefix("hr_") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let id: i64 = raw.parse().map_err(|_| {
            UpkeepError::invalid_field("ack_key", format!("unrecognized acknowledger key `{s}`"))
        })?;
        Ok(AcknowledgerKey::new(id, as_hr))
    }
}

/// One entry in a job's acknowledgment ledger.
///
/// Once `acknowledged` is true for a key, no operation reverts it; the
/// timestamp and name snapshot are frozen at first acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgmentEntry {
    pub acknowledged: bool,
    /// ISO 8601 instant recorded when acknowledged.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Display name of the acknowledger, snapshotted at acknowledgment time.
    #[serde(default)]
    pub name: Option<String>,
}

/// The central entity: a scheduled unit of facility work.
///
/// `property_name`/`property_location`/`vendor_name` are denormalized
/// snapshots taken at creation time; they may drift from the directories'
/// current truth and are never re-joined live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceJob {
    pub id: i64,
    pub property_id: i64,
    pub property_name: String,
    #[serde(default)]
    pub property_location: Option<String>,
    /// Civil calendar date the work is scheduled for.
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub vendor_id: Option<i64>,
    pub vendor_name: String,
    pub status: JobStatus,
    /// Requested time of day, `HH:MM`.
    pub requested_time: String,
    /// Set when the job first enters `ongoing`; cleared on rollback to `pending`.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Set when the job first enters `completed`; cleared on rollback to `pending`.
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    /// Acknowledgment ledger, keyed by the wire form of [`AcknowledgerKey`].
    /// At most one entry per key; absence and `acknowledged=false` are
    /// equivalent for decision-making.
    #[serde(default)]
    pub acknowledgments: BTreeMap<String, AcknowledgmentEntry>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for scheduling a new maintenance job.
///
/// Optional fields here are *requested* optional: `property_id`, `date`,
/// `type`, and `requested_time` are mandatory and validated by the engine,
/// which reports all missing fields at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJob {
    #[serde(default)]
    pub property_id: Option<i64>,
    /// Civil date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<i64>,
    /// Time of day, `HH:MM`.
    #[serde(default)]
    pub requested_time: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub description: Option<String>,
}

/// A maintainable location, owned by the external Property Registry.
///
/// The counters are derived at query time from the live job and assignment
/// sets; they are never stored, so they cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Open (non-completed) maintenance jobs referencing this property.
    #[serde(default)]
    pub maintenance_count: i64,
    /// Personnel currently assigned to this property.
    #[serde(default)]
    pub personnel_count: i64,
}

/// Input for registering a new property.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProperty {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A vendor eligible for maintenance assignment, owned by the external
/// directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub active_contracts: i64,
    #[serde(default)]
    pub performance: i64,
}

/// A staff member, owned by the external directory. HR personnel are those
/// with `role == "HR"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personnel {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    pub status: String,
}

/// Per-status job counts, recomputed from the live job set on every query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub ongoing: i64,
    pub completed: i64,
}

impl StatusCounts {
    /// Tally one job.
    pub fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Pending => self.pending += 1,
            JobStatus::Ongoing => self.ongoing += 1,
            JobStatus::Completed => self.completed += 1,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.ongoing + self.completed
    }
}

/// Status dimension of a [`SchedulerFilter`]: either everything or one
/// exact status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(JobStatus),
}

impl FromStr for StatusFilter {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        let status = JobStatus::from_str(s).map_err(|_| {
            UpkeepError::invalid_field("status", format!("unrecognized status `{s}`"))
        })?;
        Ok(StatusFilter::Only(status))
    }
}

/// Query-time filter over the job set. Never persisted; reconstructed from
/// request parameters on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerFilter {
    pub status: StatusFilter,
    pub property_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SchedulerFilter {
    /// Whether a job passes every dimension of this filter.
    pub fn matches(&self, job: &MaintenanceJob) -> bool {
        if let StatusFilter::Only(status) = self.status
            && job.status != status
        {
            return false;
        }
        if let Some(property_id) = self.property_id
            && job.property_id != property_id
        {
            return false;
        }
        if let Some(start) = self.start_date
            && job.date < start
        {
            return false;
        }
        if let Some(end) = self.end_date
            && job.date > end
        {
            return false;
        }
        true
    }
}
