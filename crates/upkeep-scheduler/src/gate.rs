// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The guarded deletion gate.
//!
//! Destructive operations require a secondary credential beyond ordinary
//! session auth. Only a SHA-256 digest of that credential is configured;
//! the plaintext is never stored, never logged, and never appears in a URL.
//! Verification happens BEFORE any existence lookup, so a caller holding a
//! wrong credential cannot probe which identifiers exist. An unconfigured
//! digest fails closed: every gated request is rejected.

use std::fmt;

use ring::constant_time;
use sha2::{Digest, Sha256};

use upkeep_core::UpkeepError;
use upkeep_storage::Database;
use upkeep_storage::queries::{jobs, properties};

/// Gate in front of the destructive operations.
#[derive(Clone)]
pub struct DeletionGate {
    db: Database,
    credential_sha256: Option<Vec<u8>>,
}

impl DeletionGate {
    /// Build the gate from the configured hex digest. `None` disables all
    /// gated operations.
    pub fn new(db: Database, credential_sha256: Option<String>) -> Result<Self, UpkeepError> {
        let credential_sha256 = match credential_sha256 {
            Some(hex_digest) => {
                let bytes = hex::decode(hex_digest.trim()).map_err(|_| {
                    UpkeepError::Config(
                        "admin.credential_sha256 is not a valid hex digest".to_string(),
                    )
                })?;
                if bytes.len() != 32 {
                    return Err(UpkeepError::Config(
                        "admin.credential_sha256 must be a 64-character SHA-256 digest"
                            .to_string(),
                    ));
                }
                Some(bytes)
            }
            None => None,
        };
        Ok(Self { db, credential_sha256 })
    }

    /// Compare the presented credential's digest against the configured one,
    /// in constant time. The error carries no detail about the cause.
    fn verify(&self, credential: &str) -> Result<(), UpkeepError> {
        let Some(expected) = &self.credential_sha256 else {
            tracing::warn!("gated deletion attempted with no credential digest configured");
            return Err(UpkeepError::Authorization);
        };
        let presented = Sha256::digest(credential.as_bytes());
        constant_time::verify_slices_are_equal(expected, &presented)
            .map_err(|_| UpkeepError::Authorization)
    }

    /// Delete a job and its acknowledgment ledger, credential permitting.
    pub async fn delete_job(&self, credential: &str, job_id: i64) -> Result<(), UpkeepError> {
        self.verify(credential)?;
        jobs::delete_job(&self.db, job_id).await?;
        tracing::info!(job_id, "maintenance job deleted");
        Ok(())
    }

    /// Delete a property, credential permitting. Open jobs block the delete
    /// unless `cascade` is set; see the property store for the policy.
    pub async fn delete_property(
        &self,
        credential: &str,
        property_id: i64,
        cascade: bool,
    ) -> Result<(), UpkeepError> {
        self.verify(credential)?;
        properties::delete_property(&self.db, property_id, cascade).await?;
        tracing::info!(property_id, cascade, "property deleted");
        Ok(())
    }
}

impl fmt::Debug for DeletionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeletionGate")
            .field("configured", &self.credential_sha256.is_some())
            .finish_non_exhaustive()
    }
}
