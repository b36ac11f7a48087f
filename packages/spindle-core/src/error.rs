//! Centralized error types for the Spindle core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::controller::ControllerError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for ControllerError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::Timeout { .. } => "controller_timeout",
            Self::Cancelled { .. } => "controller_cancelled",
            Self::Remote(_) => "controller_error",
        }
    }
}

/// Application-wide error type.
#[derive(Debug, Error, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum SpindleError {
    /// Zone reference could not be resolved (or no zones exist at all).
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// No active session with the controller.
    #[error("Not connected to the controller")]
    NotConnected,

    /// One navigation attempt found no entry matching `title` at `level`.
    ///
    /// Recoverable: the orchestrator moves on to the next variant.
    #[error("No entry matching \"{title}\" at browse level {level}")]
    PathNotFound { level: usize, title: String },

    /// Every strategy and name variant failed.
    #[error("No match after {attempts} attempt(s); last error: {last_error}")]
    AllStrategiesExhausted { attempts: usize, last_error: String },

    /// Network or remote failure talking to the controller.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Unsupported transport control verb.
    #[error("Invalid control: {0}")]
    InvalidControl(String),

    /// Client sent an invalid or malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The end-to-end budget for a play request ran out.
    #[error("Request did not complete within {budget_ms}ms")]
    Timeout { budget_ms: u64 },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SpindleError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZoneNotFound(_) => "zone_not_found",
            Self::NotConnected => "not_connected",
            Self::PathNotFound { .. } => "path_not_found",
            Self::AllStrategiesExhausted { .. } => "all_strategies_exhausted",
            Self::Transport(_) => "transport_error",
            Self::InvalidControl(_) => "invalid_control",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Timeout { .. } => "timeout",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ZoneNotFound(_)
            | Self::PathNotFound { .. }
            | Self::AllStrategiesExhausted { .. } => StatusCode::NOT_FOUND,
            Self::InvalidControl(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type SpindleResult<T> = Result<T, SpindleError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for SpindleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            success: false,
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ControllerError> for SpindleError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::NotConnected => Self::NotConnected,
            other => Self::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn exhausted_maps_to_not_found_with_last_error() {
        let err = SpindleError::AllStrategiesExhausted {
            attempts: 12,
            last_error: "No entry matching \"Rumours\" at browse level 3".into(),
        };
        assert_eq!(err.code(), "all_strategies_exhausted");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("Rumours"));
    }

    #[test]
    fn invalid_control_is_bad_request() {
        let err = SpindleError::InvalidControl("rewind".into());
        assert_eq!(err.code(), "invalid_control");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn controller_errors_convert() {
        assert_eq!(
            SpindleError::from(ControllerError::NotConnected),
            SpindleError::NotConnected
        );
        let err = SpindleError::from(ControllerError::Timeout {
            operation: "load",
            after: Duration::from_millis(5000),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("load timed out after 5000ms"));
    }

    #[test]
    fn controller_error_codes() {
        assert_eq!(ControllerError::Remote("x".into()).code(), "controller_error");
        assert_eq!(
            ControllerError::Cancelled { operation: "browse" }.code(),
            "controller_cancelled"
        );
    }
}
