//! Sitewright LLM - Generation Provider Abstraction
//!
//! Provider-agnostic trait for the two generation calls the revision
//! pipeline makes: prompt enhancement and code generation. Concrete
//! implementations live under [`providers`]; the engine treats the provider
//! as a black-box request/response function that may fail or return
//! malformed output.

pub mod providers;

pub use providers::openai::{OpenAIClient, OpenAIGenerationProvider};

use async_trait::async_trait;
use sitewright_core::SitewrightResult;

/// Trait for generation providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// Both operations take the fixed system instruction from the caller; the
/// provider contributes only transport, model selection, and response
/// extraction. Failures surface as `SitewrightError::Llm` and are treated
/// by the pipeline as recoverable (credit-back path).
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Rewrite a raw user request into a more specific instruction.
    ///
    /// # Arguments
    /// * `system_instruction` - The fixed enhancement prompt
    /// * `user_message` - The raw revision request
    async fn enhance(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> SitewrightResult<String>;

    /// Generate a complete document from the current code and an instruction.
    ///
    /// # Arguments
    /// * `system_instruction` - The fixed code-generation prompt
    /// * `context_code` - The project's current code (empty before the first
    ///   generation)
    /// * `instruction` - The enhanced change instruction
    async fn generate(
        &self,
        system_instruction: &str,
        context_code: &str,
        instruction: &str,
    ) -> SitewrightResult<String>;
}
