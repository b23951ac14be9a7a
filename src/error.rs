//! Error types for the Skribble SDK.
//!
//! Every failure surfaced by the SDK is one of four kinds:
//!
//! - [`SkribbleError::Auth`]: missing or rejected credentials.
//! - [`SkribbleError::Validation`]: a payload failed local or server-side checks.
//! - [`SkribbleError::Api`]: any other non-2xx response, or a transport failure.
//! - [`SkribbleError::Operation`]: a named operation hit an unexpected failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Skribble operations.
pub type Result<T> = std::result::Result<T, SkribbleError>;

/// Boxed cause carried by API and operation errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The closed set of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing/invalid credentials or a rejected login.
    Auth,
    /// Payload failed shape checks.
    Validation,
    /// Remote-side or transport failure.
    Api,
    /// Unexpected failure inside a named operation.
    Operation,
}

/// A single field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path of the offending field, e.g. `signatures[0].account_email`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur when using the Skribble SDK.
#[derive(Error, Debug)]
pub enum SkribbleError {
    /// Authentication error.
    #[error("Authentication error: {message}")]
    Auth {
        /// Human-readable message.
        message: String,
        /// HTTP status of the rejected login, if there was one.
        status_code: Option<u16>,
    },

    /// Validation error, local or reported by the API.
    #[error("Validation error: {message}{}", join_fields(.errors))]
    Validation {
        /// Human-readable message.
        message: String,
        /// Field-level messages.
        errors: Vec<FieldError>,
        /// HTTP status when the API rejected the payload.
        status_code: Option<u16>,
    },

    /// API error: a non-2xx response or a transport failure.
    #[error("API error ({}): {message}", status_label(.status_code))]
    Api {
        /// Human-readable message.
        message: String,
        /// HTTP status code; `None` for transport failures.
        status_code: Option<u16>,
        /// Raw response body, when one was received.
        body: Option<String>,
        /// Underlying transport or decoding error.
        #[source]
        source: Option<BoxError>,
    },

    /// A named operation failed unexpectedly.
    #[error("Operation '{operation}' failed: {message}")]
    Operation {
        /// Name of the operation, e.g. "create signature request".
        operation: String,
        /// Human-readable message.
        message: String,
        /// The original cause.
        #[source]
        source: BoxError,
    },
}

fn status_label(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => code.to_string(),
        None => "transport".to_string(),
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let fields: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!(" [{}]", fields.join("; "))
}

impl SkribbleError {
    pub(crate) fn auth(message: impl Into<String>) -> Self {
        SkribbleError::Auth {
            message: message.into(),
            status_code: None,
        }
    }

    /// Build a validation error from field-level messages.
    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        SkribbleError::Validation {
            message: message.into(),
            errors,
            status_code: None,
        }
    }

    pub(crate) fn api(
        message: impl Into<String>,
        status_code: Option<u16>,
        body: Option<String>,
    ) -> Self {
        SkribbleError::Api {
            message: message.into(),
            status_code,
            body,
            source: None,
        }
    }

    /// Wrap an unexpected failure under the name of the operation it broke.
    pub fn operation<E>(operation: impl Into<String>, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        let source = cause.into();
        SkribbleError::Operation {
            operation: operation.into(),
            message: source.to_string(),
            source,
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SkribbleError::Auth { .. } => ErrorKind::Auth,
            SkribbleError::Validation { .. } => ErrorKind::Validation,
            SkribbleError::Api { .. } => ErrorKind::Api,
            SkribbleError::Operation { .. } => ErrorKind::Operation,
        }
    }

    /// Returns the HTTP status code if available.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SkribbleError::Auth { status_code, .. }
            | SkribbleError::Validation { status_code, .. }
            | SkribbleError::Api { status_code, .. } => *status_code,
            SkribbleError::Operation { .. } => None,
        }
    }

    /// Field-level messages; empty unless this is a validation error.
    pub fn validation_errors(&self) -> &[FieldError] {
        match self {
            SkribbleError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Name of the failed operation, for operation errors.
    pub fn operation_name(&self) -> Option<&str> {
        match self {
            SkribbleError::Operation { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Raw response body of an API error.
    pub fn body(&self) -> Option<&str> {
        match self {
            SkribbleError::Api { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SkribbleError::Auth { .. })
    }

    /// Returns true if retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SkribbleError::Api { status_code, .. } => match status_code {
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SkribbleError {
    fn from(err: reqwest::Error) -> Self {
        SkribbleError::Api {
            message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
            body: None,
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkribbleError::api("Signature request not found", Some(404), None);
        assert_eq!(
            err.to_string(),
            "API error (404): Signature request not found"
        );

        let transport = SkribbleError::api("connection refused", None, None);
        assert_eq!(transport.to_string(), "API error (transport): connection refused");
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = SkribbleError::validation(
            "invalid signature request",
            vec![
                FieldError::new("title", "must not be empty"),
                FieldError::new("content", "is not valid base64"),
            ],
        );
        assert_eq!(
            err.to_string(),
            "Validation error: invalid signature request [title: must not be empty; content: is not valid base64]"
        );
        assert_eq!(err.validation_errors().len(), 2);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_operation_keeps_cause() {
        let cause = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err = SkribbleError::operation("get document", cause);

        assert_eq!(err.kind(), ErrorKind::Operation);
        assert_eq!(err.operation_name(), Some("get document"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Operation 'get document' failed:"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(SkribbleError::api("down", None, None).is_retryable());
        assert!(SkribbleError::api("busy", Some(429), None).is_retryable());
        assert!(SkribbleError::api("boom", Some(503), None).is_retryable());
        assert!(!SkribbleError::api("missing", Some(404), None).is_retryable());
        assert!(!SkribbleError::auth("bad key").is_retryable());
    }

    #[test]
    fn test_status_code() {
        let err = SkribbleError::Auth {
            message: "Invalid credentials".to_string(),
            status_code: Some(401),
        };
        assert_eq!(err.status_code(), Some(401));
        assert!(err.is_auth_error());

        let op = SkribbleError::operation("list documents", "unexpected shape");
        assert_eq!(op.status_code(), None);
        assert!(op.validation_errors().is_empty());
    }
}
