//! API Configuration Module
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development.

/// API and provider configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP server.
    pub bind_host: String,

    /// Bind port for the HTTP server.
    pub bind_port: u16,

    /// Base URL of the OpenAI-compatible generation endpoint.
    pub provider_base_url: String,

    /// API key for the generation endpoint.
    pub provider_api_key: String,

    /// Model name used for both enhancement and generation calls.
    pub provider_model: String,

    /// Provider rate limit (requests per minute).
    pub provider_requests_per_minute: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3000,
            provider_base_url: "https://api.openai.com/v1".to_string(),
            provider_api_key: String::new(),
            provider_model: "gpt-4o-mini".to_string(),
            provider_requests_per_minute: 60,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SITEWRIGHT_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `SITEWRIGHT_PORT`: Bind port (default: 3000)
    /// - `SITEWRIGHT_PROVIDER_BASE_URL`: Generation endpoint base URL
    /// - `SITEWRIGHT_PROVIDER_API_KEY`: Generation endpoint API key
    /// - `SITEWRIGHT_PROVIDER_MODEL`: Model name (default: gpt-4o-mini)
    /// - `SITEWRIGHT_PROVIDER_RPM`: Provider rate limit (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host =
            std::env::var("SITEWRIGHT_BIND").unwrap_or(defaults.bind_host);

        let bind_port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("SITEWRIGHT_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.bind_port);

        let provider_base_url = std::env::var("SITEWRIGHT_PROVIDER_BASE_URL")
            .unwrap_or(defaults.provider_base_url);

        let provider_api_key =
            std::env::var("SITEWRIGHT_PROVIDER_API_KEY").unwrap_or_default();

        let provider_model = std::env::var("SITEWRIGHT_PROVIDER_MODEL")
            .unwrap_or(defaults.provider_model);

        let provider_requests_per_minute = std::env::var("SITEWRIGHT_PROVIDER_RPM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.provider_requests_per_minute);

        Self {
            bind_host,
            bind_port,
            provider_base_url,
            provider_api_key,
            provider_model,
            provider_requests_per_minute,
        }
    }
}
