//! Sitewright API Server Entry Point
//!
//! Bootstraps configuration, the storage backend, and the generation
//! provider, then starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sitewright_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use sitewright_llm::{OpenAIClient, OpenAIGenerationProvider};
use sitewright_storage::MemoryStorage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env();
    if config.provider_api_key.is_empty() {
        tracing::warn!("SITEWRIGHT_PROVIDER_API_KEY is empty; generation calls will fail");
    }

    let storage = Arc::new(MemoryStorage::new());
    let client = OpenAIClient::with_base_url(
        config.provider_api_key.clone(),
        config.provider_base_url.clone(),
        config.provider_requests_per_minute,
    );
    let provider = Arc::new(OpenAIGenerationProvider::new(
        client,
        config.provider_model.clone(),
    ));

    let app: Router = create_api_router(AppState::new(storage, provider));

    let addr: SocketAddr = format!("{}:{}", config.bind_host, config.bind_port)
        .parse()
        .map_err(|e| ApiError::internal_error(format!("Invalid bind address: {}", e)))?;
    tracing::info!(%addr, "Starting Sitewright API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
