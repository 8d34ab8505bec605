//! Error types for Sitewright operations

use crate::{EntityType, UserId};
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: Uuid,
        reason: String,
    },

    #[error("Insufficient credits for user {user_id}: balance {balance}, required {required}")]
    InsufficientCredits {
        user_id: UserId,
        balance: i64,
        required: i64,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Generation provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Top-level error type for Sitewright operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SitewrightError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for Sitewright operations.
pub type SitewrightResult<T> = Result<T, SitewrightError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            entity_type: EntityType::Project,
            id: Uuid::nil(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Project"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_storage_error_display_insufficient_credits() {
        let err = StorageError::InsufficientCredits {
            user_id: Uuid::nil(),
            balance: 3,
            required: 5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("balance 3"));
        assert!(msg.contains("required 5"));
    }

    #[test]
    fn test_llm_error_display_request_failed() {
        let err = LlmError::RequestFailed {
            provider: "openai".to_string(),
            status: 500,
            message: "boom".to_string(),
        };
        assert!(format!("{}", err).contains("status 500"));
    }

    #[test]
    fn test_top_level_error_wraps_with_from() {
        let err: SitewrightError = LlmError::EmptyCompletion.into();
        assert!(matches!(err, SitewrightError::Llm(LlmError::EmptyCompletion)));

        let err: SitewrightError = ValidationError::RequiredFieldMissing {
            field: "message".to_string(),
        }
        .into();
        assert!(format!("{}", err).starts_with("Validation error"));
    }
}
