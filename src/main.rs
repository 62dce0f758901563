use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use tendersift::application::extraction::ExtractionPipeline;
use tendersift::application::services::AnalysisService;
use tendersift::infrastructure::llm::{GeminiBackend, OpenAiChatClient};
use tendersift::infrastructure::observability::{TracingConfig, init_tracing};
use tendersift::infrastructure::store::InMemoryDocumentStore;
use tendersift::infrastructure::text_processing::LopdfExtractor;
use tendersift::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .parse()
        .unwrap_or(Environment::Local);

    let mut settings = Settings::load(environment).context("Failed to load settings")?;

    // Keys from the process environment win over anything in settings files.
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            settings.backend.api_key = key;
        }
    }
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            settings.chat.api_key = key;
        }
    }

    init_tracing(
        TracingConfig::new(environment.as_str(), settings.logging.json),
        settings.server.port,
    );

    if settings.backend.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set, extraction endpoints will be unavailable");
    }
    if settings.chat.api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set, chat responses will be unavailable");
    }

    let backend = Arc::new(GeminiBackend::new(
        settings.backend.base_url.clone(),
        settings.backend.api_key.clone(),
    ));
    let chat_responder = Arc::new(OpenAiChatClient::new(
        settings.chat.base_url.clone(),
        settings.chat.api_key.clone(),
        settings.chat.model.clone(),
    ));
    let page_extractor = Arc::new(LopdfExtractor::new());
    let document_store = Arc::new(InMemoryDocumentStore::new());

    let pipeline = Arc::new(ExtractionPipeline::new(
        Arc::clone(&backend),
        settings.pipeline_config(),
    ));
    let analysis_service = Arc::new(AnalysisService::new(
        Arc::clone(&backend),
        settings.backend.primary_model.clone(),
        settings.backend.secondary_model.clone(),
    ));

    let state = AppState {
        pipeline,
        analysis_service,
        chat_responder,
        page_extractor,
        document_store,
        settings: settings.clone(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
