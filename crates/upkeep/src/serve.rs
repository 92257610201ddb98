// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` subcommand: wire storage, engine, views, and gateway
//! together and run until shutdown.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use upkeep_config::UpkeepConfig;
use upkeep_core::UpkeepError;
use upkeep_gateway::AppState;
use upkeep_query::ScheduleViews;
use upkeep_scheduler::{DeletionGate, MaintenanceEngine};
use upkeep_storage::{Database, SqliteDirectory};

/// Run the API server with the given configuration.
pub async fn run(config: UpkeepConfig) -> Result<(), UpkeepError> {
    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        database_path = %config.storage.database_path,
        "starting upkeep"
    );

    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;

    // The bundled deployment backs both directories with the local store;
    // the engine only ever sees the traits.
    let adapter = Arc::new(SqliteDirectory::new(db.clone()));
    let engine = MaintenanceEngine::new(db.clone(), adapter.clone(), adapter);
    let views = ScheduleViews::new(db.clone());
    let gate = DeletionGate::new(db.clone(), config.admin.credential_sha256.clone())?;
    if config.admin.credential_sha256.is_none() {
        tracing::warn!("admin.credential_sha256 not set: deletion routes will refuse all requests");
    }

    let state = AppState { db: db.clone(), engine, views, gate };

    let result =
        upkeep_gateway::start_server(&config.server.host, config.server.port, state).await;

    db.close().await?;
    result
}
