//! OpenAI-compatible generation provider implementation

use super::client::OpenAIClient;
use super::types::{CompletionRequest, CompletionResponse, Message};
use crate::providers::invalid_response;
use crate::GenerationProvider;
use async_trait::async_trait;
use sitewright_core::SitewrightResult;

/// Generation provider backed by a chat-completions endpoint.
pub struct OpenAIGenerationProvider {
    client: OpenAIClient,
    model: String,
}

impl OpenAIGenerationProvider {
    /// Create a new generation provider.
    ///
    /// # Arguments
    /// * `client` - Configured API client (key, base URL, rate limit)
    /// * `model` - Model name (e.g. "gpt-4o-mini")
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    async fn complete(&self, request: CompletionRequest) -> SitewrightResult<String> {
        let response: CompletionResponse = self.client.request("chat/completions", request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| invalid_response("openai", "No completion in response"))
    }
}

#[async_trait]
impl GenerationProvider for OpenAIGenerationProvider {
    async fn enhance(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> SitewrightResult<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_instruction.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: format!("User's request: \"{}\"", user_message),
                },
            ],
            max_tokens: Some(200),
            temperature: Some(0.3), // Focused rewrites, not creative ones
        };

        self.complete(request).await
    }

    async fn generate(
        &self,
        system_instruction: &str,
        context_code: &str,
        instruction: &str,
    ) -> SitewrightResult<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_instruction.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: format!(
                        "Here is the current website code: \"{}\" The user wants this change: \"{}\"",
                        context_code, instruction
                    ),
                },
            ],
            max_tokens: None,
            temperature: None,
        };

        self.complete(request).await
    }
}

impl std::fmt::Debug for OpenAIGenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIGenerationProvider")
            .field("model", &self.model)
            .finish()
    }
}
