// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Upkeep maintenance scheduling engine.
//!
//! A single [`Database`] handle owns the one writer connection; typed query
//! modules expose the job store, the acknowledgment ledger, and the property
//! and staff directories over it. Schema changes ship as embedded refinery
//! migrations and run on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod registry;

pub use database::Database;
pub use models::JobRecord;
pub use registry::SqliteDirectory;
