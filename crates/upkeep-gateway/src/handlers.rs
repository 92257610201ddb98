// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the REST API.
//!
//! Handlers stay thin: decode the request, call the engine/views/store, and
//! let [`ApiError`] render the failure. The guarded-deletion credential
//! travels only in the `x-admin-credential` header, never in a URL, and is
//! never logged.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use upkeep_core::UpkeepError;
use upkeep_core::types::{
    AcknowledgerKey, AcknowledgmentEntry, MaintenanceJob, NewJob, NewProperty, Personnel,
    Property, SchedulerFilter, Vendor,
};
use upkeep_query::{CalendarMonth, MaintenanceLog, PropertyOpenCount};
use upkeep_storage::queries::{directory, properties};

use crate::error::ApiError;
use crate::server::AppState;

const CREDENTIAL_HEADER: &str = "x-admin-credential";

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Common filter parameters accepted by the listing and view routes.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    /// `all` or an exact status (`pending`/`ongoing`/`completed`).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub property_id: Option<i64>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Truncation for the upcoming view only.
    #[serde(default)]
    pub limit: Option<i64>,
}

impl FilterQuery {
    fn into_filter(self) -> Result<SchedulerFilter, UpkeepError> {
        let mut filter = SchedulerFilter {
            property_id: self.property_id,
            ..SchedulerFilter::default()
        };
        if let Some(status) = self.status.as_deref() {
            filter.status = status.parse()?;
        }
        if let Some(start) = self.start_date.as_deref() {
            filter.start_date = Some(parse_date("start_date", start)?);
        }
        if let Some(end) = self.end_date.as_deref() {
            filter.end_date = Some(parse_date("end_date", end)?);
        }
        Ok(filter)
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, UpkeepError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| UpkeepError::invalid_field(field, format!("`{value}` is not a YYYY-MM-DD date")))
}

/// Pull the guarded-deletion credential out of the header. A missing header
/// fails exactly like a wrong credential.
fn credential(headers: &HeaderMap) -> Result<&str, UpkeepError> {
    headers
        .get(CREDENTIAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(UpkeepError::Authorization)
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /v1/jobs
pub async fn post_jobs(
    State(state): State<AppState>,
    Json(body): Json<NewJob>,
) -> Result<(StatusCode, Json<MaintenanceJob>), ApiError> {
    let job = state.engine.schedule_job(body).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /v1/jobs
pub async fn get_jobs(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<MaintenanceJob>>, ApiError> {
    let jobs = state.engine.list_jobs(query.into_filter()?).await?;
    Ok(Json(jobs))
}

/// GET /v1/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MaintenanceJob>, ApiError> {
    Ok(Json(state.engine.get_job(id).await?))
}

/// Request body for PATCH /v1/jobs/{id}/status.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    /// Target status, wire form (`pending`/`ongoing`/`completed`).
    pub status: String,
}

/// PATCH /v1/jobs/{id}/status
pub async fn patch_job_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<MaintenanceJob>, ApiError> {
    let job = state.engine.set_status(id, &body.status).await?;
    Ok(Json(job))
}

/// Request body for POST /v1/jobs/{id}/acknowledgments.
#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub personnel_id: Option<i64>,
    /// Acknowledge in HR capacity (ledger key `hr_<id>`); defaults to the
    /// general capacity (ledger key `<id>`).
    #[serde(default)]
    pub as_hr: bool,
}

/// POST /v1/jobs/{id}/acknowledgments
pub async fn post_acknowledgment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AcknowledgeRequest>,
) -> Result<Json<AcknowledgmentEntry>, ApiError> {
    let personnel_id = body
        .personnel_id
        .ok_or_else(|| UpkeepError::missing_fields(vec!["personnel_id".to_string()]))?;
    let key = AcknowledgerKey::new(personnel_id, body.as_hr);
    let entry = state.engine.acknowledge(id, key).await?;
    Ok(Json(entry))
}

/// Response body for GET /v1/jobs/{id}/acknowledgments.
#[derive(Debug, Serialize)]
pub struct AcknowledgmentViewResponse {
    /// Ledger entries keyed by wire-form acknowledger key.
    pub entries: BTreeMap<String, AcknowledgmentEntry>,
    /// Personnel eligible to acknowledge in HR capacity.
    pub hr_roster: Vec<Personnel>,
}

/// GET /v1/jobs/{id}/acknowledgments
pub async fn get_acknowledgments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AcknowledgmentViewResponse>, ApiError> {
    let view = state.engine.acknowledgment_view(id).await?;
    Ok(Json(AcknowledgmentViewResponse {
        entries: view.entries,
        hr_roster: view.hr_roster,
    }))
}

/// DELETE /v1/jobs/{id}
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let credential = credential(&headers)?;
    state.gate.delete_job(credential, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/calendar/{year}/{month}
pub async fn get_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<CalendarMonth>, ApiError> {
    let month_view = state
        .views
        .calendar_month(year, month, query.into_filter()?)
        .await?;
    Ok(Json(month_view))
}

/// GET /v1/upcoming
pub async fn get_upcoming(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<MaintenanceJob>>, ApiError> {
    let limit = query.limit;
    let filter = query.into_filter()?;
    let today = Local::now().date_naive();
    let jobs = state.views.upcoming(today, filter, limit).await?;
    Ok(Json(jobs))
}

/// GET /v1/log
pub async fn get_log(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<MaintenanceLog>, ApiError> {
    Ok(Json(state.views.log(query.into_filter()?).await?))
}

/// POST /v1/properties
pub async fn post_properties(
    State(state): State<AppState>,
    Json(body): Json<NewProperty>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let mut missing = Vec::new();
    if body.name.as_deref().is_none_or(str::is_empty) {
        missing.push("name".to_string());
    }
    if body.location.as_deref().is_none_or(str::is_empty) {
        missing.push("location".to_string());
    }
    if !missing.is_empty() {
        return Err(UpkeepError::missing_fields(missing).into());
    }
    let property = properties::create_property(
        &state.db,
        body.name.unwrap_or_default(),
        body.location.unwrap_or_default(),
        body.description,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// GET /v1/properties
pub async fn get_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<Property>>, ApiError> {
    Ok(Json(properties::list_properties(&state.db).await?))
}

/// GET /v1/properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Property>, ApiError> {
    let property = properties::get_property(&state.db, id)
        .await?
        .ok_or(UpkeepError::NotFound { kind: "property", id })?;
    Ok(Json(property))
}

/// Query parameters for DELETE /v1/properties/{id}.
#[derive(Debug, Default, Deserialize)]
pub struct DeletePropertyQuery {
    /// Also delete the property's open jobs instead of rejecting.
    #[serde(default)]
    pub cascade: bool,
}

/// DELETE /v1/properties/{id}
pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DeletePropertyQuery>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let credential = credential(&headers)?;
    state.gate.delete_property(credential, id, query.cascade).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/properties/open-counts
pub async fn get_open_counts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PropertyOpenCount>>, ApiError> {
    Ok(Json(state.views.open_counts_by_property().await?))
}

/// Request body for POST /v1/properties/{id}/personnel.
#[derive(Debug, Deserialize)]
pub struct AssignPersonnelRequest {
    pub personnel_id: Option<i64>,
}

/// POST /v1/properties/{id}/personnel
pub async fn post_property_personnel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AssignPersonnelRequest>,
) -> Result<StatusCode, ApiError> {
    let personnel_id = body
        .personnel_id
        .ok_or_else(|| UpkeepError::missing_fields(vec!["personnel_id".to_string()]))?;
    properties::assign_personnel(&state.db, id, personnel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for POST /v1/vendors.
#[derive(Debug, Deserialize)]
pub struct NewVendorRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// POST /v1/vendors
pub async fn post_vendors(
    State(state): State<AppState>,
    Json(body): Json<NewVendorRequest>,
) -> Result<(StatusCode, Json<Vendor>), ApiError> {
    let mut missing = Vec::new();
    if body.name.as_deref().is_none_or(str::is_empty) {
        missing.push("name".to_string());
    }
    if body.category.as_deref().is_none_or(str::is_empty) {
        missing.push("category".to_string());
    }
    if !missing.is_empty() {
        return Err(UpkeepError::missing_fields(missing).into());
    }
    let vendor = directory::create_vendor(
        &state.db,
        body.name.unwrap_or_default(),
        body.category.unwrap_or_default(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// Query parameters for GET /v1/vendors.
#[derive(Debug, Default, Deserialize)]
pub struct VendorQuery {
    #[serde(default)]
    pub category: Option<String>,
}

/// GET /v1/vendors
pub async fn get_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorQuery>,
) -> Result<Json<Vec<Vendor>>, ApiError> {
    Ok(Json(directory::list_vendors(&state.db, query.category).await?))
}

/// Request body for POST /v1/personnel.
#[derive(Debug, Deserialize)]
pub struct NewPersonnelRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
}

/// POST /v1/personnel
pub async fn post_personnel(
    State(state): State<AppState>,
    Json(body): Json<NewPersonnelRequest>,
) -> Result<(StatusCode, Json<Personnel>), ApiError> {
    let mut missing = Vec::new();
    if body.name.as_deref().is_none_or(str::is_empty) {
        missing.push("name".to_string());
    }
    if body.email.as_deref().is_none_or(str::is_empty) {
        missing.push("email".to_string());
    }
    if body.role.as_deref().is_none_or(str::is_empty) {
        missing.push("role".to_string());
    }
    if !missing.is_empty() {
        return Err(UpkeepError::missing_fields(missing).into());
    }
    let person = directory::create_personnel(
        &state.db,
        body.name.unwrap_or_default(),
        body.email.unwrap_or_default(),
        body.role.unwrap_or_default(),
        body.location,
        body.shift,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// Query parameters for GET /v1/personnel.
#[derive(Debug, Default, Deserialize)]
pub struct PersonnelQuery {
    #[serde(default)]
    pub role: Option<String>,
}

/// GET /v1/personnel
pub async fn get_personnel_list(
    State(state): State<AppState>,
    Query(query): Query<PersonnelQuery>,
) -> Result<Json<Vec<Personnel>>, ApiError> {
    Ok(Json(directory::list_personnel(&state.db, query.role).await?))
}
