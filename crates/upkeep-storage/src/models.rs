// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-side record types.
//!
//! The canonical domain types live in `upkeep-core::types`; this module
//! re-exports them for convenience and adds the validated record shape the
//! scheduling engine hands to the insert path.

use chrono::NaiveDate;

pub use upkeep_core::types::{
    AcknowledgmentEntry, JobStatus, MaintenanceJob, Personnel, Priority, Property, Vendor,
};

/// A fully validated maintenance job ready for insertion.
///
/// Built by the scheduling engine after directory resolution: the property
/// and vendor names here are snapshots taken at creation time.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub property_id: i64,
    pub property_name: String,
    pub property_location: Option<String>,
    pub date: NaiveDate,
    pub job_type: String,
    pub vendor_id: Option<i64>,
    pub vendor_name: String,
    pub requested_time: String,
    pub priority: Priority,
    pub description: Option<String>,
}
