//! Generation provider implementations
//!
//! Concrete implementations of the GenerationProvider trait. The OpenAI
//! module speaks the chat-completions wire format, which OpenRouter-style
//! gateways also accept via a custom base URL.

pub mod openai;

pub use openai::{OpenAIClient, OpenAIGenerationProvider};

use sitewright_core::{LlmError, SitewrightError};

/// Build a RequestFailed error.
pub(crate) fn request_failed(
    provider: &str,
    status: i32,
    message: impl Into<String>,
) -> SitewrightError {
    SitewrightError::Llm(LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

/// Build a RateLimited error.
pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> SitewrightError {
    SitewrightError::Llm(LlmError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    })
}

/// Build an InvalidResponse error.
pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> SitewrightError {
    SitewrightError::Llm(LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}
