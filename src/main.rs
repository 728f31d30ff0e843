//! Glucose Companion - conversational diabetes self-care assistant
//!
//! An HTTP chat backend that walks a user through a fixed dialogue flow,
//! logs blood glucose readings and summarizes their trend.

mod api;
mod config;
mod glucose;
mod intent;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod system_prompt;
mod trend;

use api::{create_router, AppState};
use config::AppConfig;
use llm::{LlmService, LoggingService, OpenAIService, UnconfiguredService};
use runtime::{ChatRuntime, Generator, LlmGenerator};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glucose_companion=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    let config = AppConfig::from_env();

    let service: Arc<dyn LlmService> = match config.llm.api_key.as_deref() {
        Some(key) => Arc::new(OpenAIService::new(key, &config.llm)?),
        None => {
            tracing::warn!("No LLM API key configured. Set OPENAI_API_KEY; generated replies will fall back.");
            Arc::new(UnconfiguredService)
        }
    };
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(service));
    tracing::info!(model = %service.model_id(), "Generation backend initialized");

    let generator: Arc<dyn Generator> = Arc::new(LlmGenerator::new(
        service,
        config.llm.temperature,
        config.llm.max_tokens,
    ));
    let state = AppState::new(ChatRuntime::new(generator));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    let addr = config.bind_addr();
    tracing::info!("Glucose Companion listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
