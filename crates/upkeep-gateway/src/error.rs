// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP rendering of domain errors.
//!
//! The status mapping is fixed: validation is 400, unknown identifiers are
//! 404, credential failures are 403 with a deliberately uniform body, and
//! everything internal is a bare 500 with details kept in the server log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use upkeep_core::UpkeepError;

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Newtype so domain errors can flow out of handlers with `?`.
#[derive(Debug)]
pub struct ApiError(pub UpkeepError);

impl From<UpkeepError> for ApiError {
    fn from(err: UpkeepError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            UpkeepError::Validation { message, fields } => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: message, fields },
            ),
            err @ UpkeepError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ErrorBody { error: err.to_string(), fields: Vec::new() },
            ),
            // One body for every authorization failure: wrong credential,
            // missing credential, and unconfigured gate are
            // indistinguishable from outside.
            UpkeepError::Authorization => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error: "authorization failed".to_string(),
                    fields: Vec::new(),
                },
            ),
            UpkeepError::Config(message) => {
                tracing::error!(%message, "configuration error surfaced on a request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: "internal error".to_string(), fields: Vec::new() },
                )
            }
            UpkeepError::Storage { source } => {
                tracing::error!(error = %source, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: "internal error".to_string(), fields: Vec::new() },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_field_names() {
        let err = ApiError(UpkeepError::missing_fields(vec!["date".into()]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError(UpkeepError::NotFound { kind: "job", id: 9 });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn authorization_maps_to_403() {
        let err = ApiError(UpkeepError::Authorization);
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn storage_maps_to_500() {
        let err = ApiError(UpkeepError::Storage {
            source: "disk on fire".into(),
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_body_omits_empty_fields() {
        let body = ErrorBody { error: "authorization failed".into(), fields: Vec::new() };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"authorization failed"}"#);
    }
}
