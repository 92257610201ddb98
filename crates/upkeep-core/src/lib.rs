// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Upkeep maintenance scheduling engine.
//!
//! Provides the error taxonomy, domain types, and the directory traits
//! through which the scheduling core consumes its external collaborators
//! (Property Registry, Vendor/Personnel Directory).

pub mod error;
pub mod traits;
pub mod types;

pub use error::UpkeepError;
pub use traits::{PropertyRegistry, StaffDirectory};
pub use types::{
    AcknowledgerKey, AcknowledgmentEntry, JobStatus, MaintenanceJob, NewJob, NewProperty,
    Personnel, Priority, Property, SchedulerFilter, StatusCounts, StatusFilter, Vendor,
};
