//! Error Types for the Sitewright API
//!
//! Defines error handling for the HTTP layer: an ErrorCode enum mapping to
//! status codes, an ApiError struct serialized as JSON, and the conversion
//! from engine errors. All errors come back as `{ code, message }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sitewright_core::{
    EntityType, LlmError, SitewrightError, StorageError, ValidationError,
};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request lacks a verified identity
    Unauthorized,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Requested user does not exist
    UserNotFound,

    /// Requested project does not exist (or is not visible to the caller)
    ProjectNotFound,

    /// Requested version does not exist or belongs to another project
    VersionNotFound,

    /// Balance below the revision cost
    InsufficientCredits,

    /// Upstream generation call failed or returned nothing usable
    GenerationFailed,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,

            ErrorCode::InvalidInput | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::UserNotFound
            | ErrorCode::ProjectNotFound
            | ErrorCode::VersionNotFound => StatusCode::NOT_FOUND,

            ErrorCode::InsufficientCredits => StatusCode::FORBIDDEN,

            ErrorCode::GenerationFailed => StatusCode::BAD_GATEWAY,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::VersionNotFound => "Version not found",
            ErrorCode::InsufficientCredits => "Not enough credits",
            ErrorCode::GenerationFailed => "Generation failed, please try again",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Create an Unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InternalError error.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
        }
        (status, Json(self)).into_response()
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// ENGINE ERROR CONVERSION
// ============================================================================

impl From<SitewrightError> for ApiError {
    fn from(err: SitewrightError) -> Self {
        match err {
            SitewrightError::Storage(StorageError::NotFound { entity_type, id }) => {
                let code = match entity_type {
                    EntityType::User => ErrorCode::UserNotFound,
                    EntityType::Version => ErrorCode::VersionNotFound,
                    EntityType::Project | EntityType::Message => ErrorCode::ProjectNotFound,
                };
                ApiError::new(code, format!("{:?} {} not found", entity_type, id))
            }
            SitewrightError::Storage(StorageError::InsufficientCredits { .. }) => {
                ApiError::from_code(ErrorCode::InsufficientCredits)
            }
            SitewrightError::Storage(other) => {
                tracing::error!(error = %other, "storage failure");
                ApiError::from_code(ErrorCode::InternalError)
            }
            SitewrightError::Llm(LlmError::EmptyCompletion) => ApiError::new(
                ErrorCode::GenerationFailed,
                "Unable to generate the code, please try again",
            ),
            SitewrightError::Llm(other) => {
                tracing::warn!(error = %other, "generation provider failure");
                ApiError::from_code(ErrorCode::GenerationFailed)
            }
            SitewrightError::Validation(ValidationError::RequiredFieldMissing { field }) => {
                ApiError::missing_field(&field)
            }
            SitewrightError::Validation(other) => ApiError::invalid_input(other.to_string()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
