// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed implementation of the directory traits.
//!
//! The scheduling engine only sees [`PropertyRegistry`] and
//! [`StaffDirectory`]; this adapter is how the bundled deployment satisfies
//! them from the local database. A remote registry would implement the same
//! traits without touching the engine.

use async_trait::async_trait;

use upkeep_core::{PropertyRegistry, StaffDirectory, UpkeepError};
use upkeep_core::types::{Personnel, Property, Vendor};

use crate::database::Database;
use crate::queries::{directory, properties};

/// Directory adapter over the single-writer database.
#[derive(Clone)]
pub struct SqliteDirectory {
    db: Database,
}

impl SqliteDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PropertyRegistry for SqliteDirectory {
    async fn get_property(&self, id: i64) -> Result<Option<Property>, UpkeepError> {
        properties::get_property(&self.db, id).await
    }

    async fn list_properties(&self) -> Result<Vec<Property>, UpkeepError> {
        properties::list_properties(&self.db).await
    }
}

#[async_trait]
impl StaffDirectory for SqliteDirectory {
    async fn get_vendor(&self, id: i64) -> Result<Option<Vendor>, UpkeepError> {
        directory::get_vendor(&self.db, id).await
    }

    async fn list_vendors(&self, category: Option<&str>) -> Result<Vec<Vendor>, UpkeepError> {
        directory::list_vendors(&self.db, category.map(str::to_owned)).await
    }

    async fn get_personnel(&self, id: i64) -> Result<Option<Personnel>, UpkeepError> {
        directory::get_personnel(&self.db, id).await
    }

    async fn list_personnel(&self, role: Option<&str>) -> Result<Vec<Personnel>, UpkeepError> {
        directory::list_personnel(&self.db, role.map(str::to_owned)).await
    }
}
