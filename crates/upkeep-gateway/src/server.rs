// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the API surface.

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use upkeep_core::UpkeepError;
use upkeep_query::ScheduleViews;
use upkeep_scheduler::{DeletionGate, MaintenanceEngine};
use upkeep_storage::Database;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Single-writer database handle, used directly by the directory CRUD
    /// handlers.
    pub db: Database,
    /// Scheduling engine for job creation, transitions, acknowledgments.
    pub engine: MaintenanceEngine,
    /// Read-side views (calendar, upcoming, log, open counts).
    pub views: ScheduleViews,
    /// Guarded deletion gate for destructive routes.
    pub gate: DeletionGate,
}

/// Build the full route table.
pub fn build_router(state: AppState) -> Router {
    // /health stays outside /v1 so probes survive API versioning.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/jobs", post(handlers::post_jobs).get(handlers::get_jobs))
        .route(
            "/v1/jobs/{id}",
            get(handlers::get_job).delete(handlers::delete_job),
        )
        .route("/v1/jobs/{id}/status", patch(handlers::patch_job_status))
        .route(
            "/v1/jobs/{id}/acknowledgments",
            get(handlers::get_acknowledgments).post(handlers::post_acknowledgment),
        )
        .route("/v1/calendar/{year}/{month}", get(handlers::get_calendar))
        .route("/v1/upcoming", get(handlers::get_upcoming))
        .route("/v1/log", get(handlers::get_log))
        .route(
            "/v1/properties",
            post(handlers::post_properties).get(handlers::get_properties),
        )
        .route("/v1/properties/open-counts", get(handlers::get_open_counts))
        .route(
            "/v1/properties/{id}",
            get(handlers::get_property).delete(handlers::delete_property),
        )
        .route(
            "/v1/properties/{id}/personnel",
            post(handlers::post_property_personnel),
        )
        .route(
            "/v1/vendors",
            post(handlers::post_vendors).get(handlers::get_vendors),
        )
        .route(
            "/v1/personnel",
            post(handlers::post_personnel).get(handlers::get_personnel_list),
        )
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the task is cancelled.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), UpkeepError> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| UpkeepError::Config(format!("failed to bind to {addr}: {e}")))?;

    tracing::info!("API server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| UpkeepError::Config(format!("server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;
    use upkeep_storage::SqliteDirectory;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("router.db").to_str().unwrap())
            .await
            .unwrap();
        let adapter = Arc::new(SqliteDirectory::new(db.clone()));
        let state = AppState {
            db: db.clone(),
            engine: MaintenanceEngine::new(db.clone(), adapter.clone(), adapter),
            views: ScheduleViews::new(db.clone()),
            gate: DeletionGate::new(db, None).unwrap(),
        };
        let _router = build_router(state.clone());
        let _cloned = state;
    }
}
