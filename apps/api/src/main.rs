mod coach;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod optimize;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::{ExtractionPipeline, ExtractionSettings};
use crate::llm_client::{LlmClient, TextCompletion};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Cleanup model (Ollama by default); optional by configuration
    let cleanup_llm: Option<Arc<dyn TextCompletion>> = if config.cleanup_enabled {
        let client = LlmClient::new(&config.cleanup_llm)?;
        info!(
            "Cleanup client initialized (model: {}, endpoint: {})",
            client.model(),
            config.cleanup_llm.base_url
        );
        Some(Arc::new(client))
    } else {
        info!("Cleanup stage disabled");
        None
    };

    // Analysis and coaching model (Groq); absent without an API key
    let analysis_llm: Option<Arc<dyn TextCompletion>> = match &config.analysis_llm {
        Some(endpoint) => {
            let client = LlmClient::new(endpoint)?;
            info!("Analysis client initialized (model: {})", client.model());
            Some(Arc::new(client))
        }
        None => {
            info!("GROQ_API_KEY not set; /api/v1/optimize and /api/v1/chat will report not configured");
            None
        }
    };

    let settings = ExtractionSettings::from(&config);
    info!(
        "Extraction settings: line_tolerance={} min_content_chars={} timeout={:?}",
        settings.line_tolerance, settings.min_content_chars, settings.request_timeout
    );

    // Build app state
    let state = AppState {
        extraction: ExtractionPipeline::new(cleanup_llm, settings),
        analysis_llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
