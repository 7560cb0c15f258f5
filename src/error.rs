//! Error handling for the Orbit client

use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Error body returned by PostgREST on a failed request
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Unified error type for the Orbit client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A field value violates its type or range constraint
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value outside a closed enumeration
    #[error("Validation error: invalid value '{value}' for field '{field}'")]
    InvalidEnum { field: String, value: String },

    /// A required Insert field was not supplied
    #[error("Validation error: missing required field '{field}' on '{table}'")]
    MissingField { table: String, field: String },

    /// An Update tried to change a row's id
    #[error("Identity error: id of {table} row {id} cannot be changed")]
    ImmutableId { table: String, id: Uuid },

    /// A user_id that does not reference an existing profile
    #[error("Identity error: no profile with id {0}")]
    UnknownUser(Uuid),

    /// Foreign key violation reported by the hosted database
    #[error("Identity error: {0}")]
    ForeignKey(String),

    #[error("Not found: no {table} row with id {id}")]
    NotFound { table: String, id: Uuid },

    #[error("Conflict: {table} row with id {id} already exists")]
    Conflict { table: String, id: Uuid },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// PostgREST returned an error that has no more specific mapping
    #[error("API error: {details} (Status: {status})")]
    Api { status: u16, details: ApiErrorDetails },

    /// A response that does not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    pub fn invalid_enum(field: &str, value: &str) -> Self {
        Error::InvalidEnum {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn missing_field(table: &str, field: &str) -> Self {
        Error::MissingField {
            table: table.to_string(),
            field: field.to_string(),
        }
    }

    pub fn not_found(table: &str, id: Uuid) -> Self {
        Error::NotFound {
            table: table.to_string(),
            id,
        }
    }

    /// Map a failed PostgREST response onto the error taxonomy
    pub fn from_api(status: u16, details: ApiErrorDetails) -> Self {
        let message = details
            .message
            .clone()
            .unwrap_or_else(|| details.to_string());
        match details.code.as_deref() {
            Some("22P02") | Some("23502") | Some("23514") => Error::Validation(message),
            Some("23503") => Error::ForeignKey(message),
            _ => Error::Api { status, details },
        }
    }

    /// True for errors raised at the boundary before anything was persisted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InvalidEnum { .. } | Error::MissingField { .. }
        )
    }

    /// True for errors about row identity or ownership
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            Error::ImmutableId { .. } | Error::UnknownUser(_) | Error::ForeignKey(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn details(code: &str) -> ApiErrorDetails {
        ApiErrorDetails {
            code: Some(code.to_string()),
            message: Some("boom".to_string()),
            details: None,
            hint: None,
        }
    }

    #[test]
    fn maps_postgres_codes() {
        assert!(Error::from_api(400, details("22P02")).is_validation());
        assert!(Error::from_api(400, details("23502")).is_validation());
        assert!(Error::from_api(409, details("23503")).is_identity());
        assert!(matches!(
            Error::from_api(409, details("23505")),
            Error::Api { status: 409, .. }
        ));
    }

    #[test]
    fn details_display_skips_missing_parts() {
        let d = ApiErrorDetails {
            code: Some("42P01".to_string()),
            hint: Some("check the table name".to_string()),
            ..Default::default()
        };
        assert_eq!(d.to_string(), "Code: 42P01, Hint: check the table name");
    }
}
