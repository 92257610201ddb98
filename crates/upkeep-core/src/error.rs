// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Upkeep maintenance scheduling engine.

use thiserror::Error;

/// The primary error type used across all Upkeep crates.
///
/// Every variant surfaces to callers as a distinct, inspectable value; none
/// are silently swallowed. Note that re-acknowledging an already-acknowledged
/// job is a successful no-op, not an error.
#[derive(Debug, Error)]
pub enum UpkeepError {
    /// Missing or malformed required fields on a request, or an unrecognized
    /// status value on a transition. `fields` names the offending inputs so
    /// the caller can correct the request.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<String>,
    },

    /// A referenced job/property/vendor/personnel identifier does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    /// Guarded-deletion credential mismatch. The message is deliberately
    /// generic and identical whether or not the target identifier exists.
    #[error("authorization failed")]
    Authorization,

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl UpkeepError {
    /// Build a validation error for a set of missing required fields.
    pub fn missing_fields(fields: Vec<String>) -> Self {
        UpkeepError::Validation {
            message: format!("missing required fields: {}", fields.join(", ")),
            fields,
        }
    }

    /// Build a validation error for a single malformed field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        UpkeepError::Validation {
            message: message.into(),
            fields: vec![field.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_all_names() {
        let err = UpkeepError::missing_fields(vec!["date".into(), "type".into()]);
        let UpkeepError::Validation { message, fields } = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("date"));
        assert!(message.contains("type"));
        assert_eq!(fields, vec!["date", "type"]);
    }

    #[test]
    fn not_found_names_kind_and_id() {
        let err = UpkeepError::NotFound { kind: "job", id: 42 };
        assert_eq!(err.to_string(), "job not found: 42");
    }

    #[test]
    fn authorization_error_is_generic() {
        // The message must not reveal anything about the target.
        let err = UpkeepError::Authorization;
        assert_eq!(err.to_string(), "authorization failed");
    }
}
