// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory traits: the Property Registry and Vendor/Personnel Directory.
//!
//! The scheduling core consumes both read-only. Resolution calls are
//! potential I/O waits against a collaborator; the engine fails closed
//! (rejects the write) if resolution fails.

use async_trait::async_trait;

use crate::error::UpkeepError;
use crate::types::{Personnel, Property, Vendor};

/// Read-only view of the Property Registry.
#[async_trait]
pub trait PropertyRegistry: Send + Sync {
    /// Resolve a property by id. `Ok(None)` means the id does not exist.
    async fn get_property(&self, id: i64) -> Result<Option<Property>, UpkeepError>;

    /// All registered properties, with derived counters populated.
    async fn list_properties(&self) -> Result<Vec<Property>, UpkeepError>;
}

/// Read-only view of the Vendor/Personnel Directory.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Resolve a vendor by id. `Ok(None)` means the id does not exist.
    async fn get_vendor(&self, id: i64) -> Result<Option<Vendor>, UpkeepError>;

    /// Vendors, optionally restricted to one category.
    async fn list_vendors(&self, category: Option<&str>) -> Result<Vec<Vendor>, UpkeepError>;

    /// Resolve a staff member by id. `Ok(None)` means the id does not exist.
    async fn get_personnel(&self, id: i64) -> Result<Option<Personnel>, UpkeepError>;

    /// Staff, optionally restricted to one role (e.g. `"HR"`).
    async fn list_personnel(&self, role: Option<&str>) -> Result<Vec<Personnel>, UpkeepError>;
}
