use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Failures raised while turning raw document text into a credit report.
///
/// Only the document reader produces these; the normalizer degrades to
/// nulls and empty sequences instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The text does not start with a markup delimiter.
    #[error("input does not appear to be XML")]
    NotXml,
    /// The text looks like markup but could not be parsed.
    #[error("malformed XML document at byte {position}: {message}")]
    MalformedDocument { position: u64, message: String },
    /// Reserved for shape checks on the parsed tree. Never produced today.
    #[error("unexpected document shape: {0}")]
    UnexpectedShape(String),
}

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Database-related errors.
    DatabaseError(sqlx::Error),
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Uploaded payload exceeds the configured size limit.
    PayloadTooLarge(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and a `{"error": ...}` body.
    ///
    /// Server-side failures are logged here and replaced by a generic message
    /// so database details never reach the client.
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<ReportError> for AppError {
    /// Every document failure is a client-input problem.
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NotXml => {
                AppError::BadRequest("Uploaded file does not appear to be XML.".to_string())
            }
            ReportError::MalformedDocument { .. } => {
                tracing::warn!("Rejected malformed upload: {}", err);
                AppError::BadRequest(format!("Malformed XML document: {}", err))
            }
            ReportError::UnexpectedShape(msg) => {
                AppError::BadRequest(format!("Unexpected document shape: {}", msg))
            }
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

/// Extension for sqlx::Error to add context
impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_xml_maps_to_bad_request() {
        let response = AppError::from(ReportError::NotXml).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_context_keeps_underlying_status() {
        let result: Result<(), AppError> = Err(AppError::NotFound("Report not found".into()));
        let err = result.context("loading report").unwrap_err();
        assert_eq!(err.to_string(), "loading report: Not found: Report not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_malformed_document_message_carries_diagnostic() {
        let err = ReportError::MalformedDocument {
            position: 12,
            message: "unclosed element <Header>".into(),
        };
        match AppError::from(err) {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("byte 12"));
                assert!(msg.contains("unclosed element <Header>"));
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }
}
