//! Application error types with HTTP status code mapping.
//!
//! [`AppError`] is the central error type of the crate. Each variant maps to
//! a specific HTTP status code and structured JSON error response.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BookingId, ListingId};
use crate::serializer::{NON_FIELD_ERRORS, ValidationErrors};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: user_email: Enter a valid email address.",
///     "details": { "user_email": ["Enter a valid email address."] }
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`AppError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Per-field messages for validation and reference errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status               |
/// |-----------|------------|---------------------------|
/// | 1000–1999 | Validation | 400 Bad Request           |
/// | 2000–2999 | Not Found  | 404 Not Found             |
/// | 3000–3999 | Server     | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input failed field validation; nothing was written.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A booking referenced a listing that does not exist.
    #[error("invalid listing reference: {0}")]
    InvalidReference(ListingId),

    /// Listing with the given id was not found.
    #[error("listing not found: {0}")]
    ListingNotFound(ListingId),

    /// Booking with the given id was not found.
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The path segment is not a record id at all, so nothing can match it.
    #[error("not found: {0}")]
    NotFound(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl AppError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidReference(_) => 1002,
            Self::ListingNotFound(_) => 2001,
            Self::NotFound(_) => 2000,
            Self::BookingNotFound(_) => 2002,
            Self::Persistence(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidReference(_) => StatusCode::BAD_REQUEST,
            Self::ListingNotFound(_) | Self::BookingNotFound(_) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Per-field messages carried by validation and reference errors.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        let errors = match self {
            Self::Validation(errors) => errors.clone(),
            Self::InvalidReference(listing) => ValidationErrors::single(
                "listing",
                format!("Invalid pk \"{listing}\" - object does not exist."),
            ),
            _ => return None,
        };
        serde_json::to_value(errors).ok()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::single(
            NON_FIELD_ERRORS,
            rejection.body_text(),
        ))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
