// crates/cosmic-ruler-server/src/error.rs
// ============================================================================
// Module: API Errors
// Description: Caller-facing error taxonomy and its HTTP mapping.
// Purpose: Map domain failures onto status codes without leaking internals.
// Dependencies: cosmic-ruler-core, axum, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! Every handler returns [`ApiError`] on failure. Client errors carry their
//! message verbatim; [`ApiError::Internal`] is logged in full and answered
//! with a generic message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use cosmic_ruler_core::AdminError;
use cosmic_ruler_core::MeasureError;
use cosmic_ruler_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Body message for every internal failure.
pub const INTERNAL_MESSAGE: &str = "internal server error";

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Request failures, one variant per response class.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing, or out-of-range input (400).
    #[error("{0}")]
    Validation(String),
    /// Policy rejection such as a banned name (403).
    #[error("{0}")]
    Forbidden(String),
    /// Addressed record does not exist (404).
    #[error("{0}")]
    NotFound(String),
    /// Missing, invalid, or expired session (401).
    #[error("{0}")]
    Unauthorized(String),
    /// Setup already completed or a uniqueness rule was hit (409).
    #[error("{0}")]
    Conflict(String),
    /// Anything else; detail is logged, never returned (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message sent to the caller.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Conflict(message) => message,
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    /// Caller-facing message.
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<MeasureError> for ApiError {
    fn from(err: MeasureError) -> Self {
        match err {
            MeasureError::Validation(err) => err.into(),
            MeasureError::Banned {
                message,
            } => Self::Forbidden(message),
            MeasureError::NotMeasured => Self::NotFound(MeasureError::NotMeasured.to_string()),
            MeasureError::Store(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(err) => err.into(),
            AdminError::SetupClosed => Self::Conflict(err.to_string()),
            AdminError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AdminError::NotFound(message) => Self::NotFound(message.to_string()),
            AdminError::Conflict(message) => Self::Conflict(message.to_string()),
            AdminError::Store(_) | AdminError::Entropy(_) | AdminError::Credential(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
