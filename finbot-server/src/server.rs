//! HTTP layer: router, handlers, and one-shot startup assembly.
//!
//! The pipeline and its vector index are built exactly once in
//! [`build_state`] and then shared read-only with every request handler
//! through [`AppState`]. Handlers never rebuild or mutate the pipeline.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use finbot_rag::{
    EmbeddingProvider, FixedSizeChunker, GenerationProvider, InMemoryVectorStore,
    OpenAIChatProvider, OpenAIEmbeddingProvider, QaPipeline, RagConfig,
    openai::API_KEY_ENV,
};

use crate::knowledge::load_document;

/// The fixed body of `GET /`.
pub const WELCOME_MESSAGE: &str = "Welcome to the Financial Literacy RAG Chatbot API!";

/// The single vector store collection the service indexes and queries.
const COLLECTION: &str = "financial_literacy";

/// Server configuration: bind address and knowledge document location.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path to the knowledge document indexed at startup.
    pub document_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            document_path: PathBuf::from("financial_literacy.txt"),
        }
    }
}

impl ServerConfig {
    /// Read configuration from `FINBOT_HOST`, `FINBOT_PORT`, and
    /// `FINBOT_DOCUMENT`, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("FINBOT_HOST").unwrap_or(defaults.host),
            port: std::env::var("FINBOT_PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            document_path: std::env::var("FINBOT_DOCUMENT")
                .map(PathBuf::from)
                .unwrap_or(defaults.document_path),
        }
    }
}

/// Shared, read-only state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QaPipeline>,
    pub collection: String,
    /// True when the knowledge document was missing and the built-in
    /// placeholder is the only indexed content.
    pub fallback_mode: bool,
}

/// Assemble the application state: load the document, build the pipeline,
/// and index the document's chunks. Runs exactly once at startup.
///
/// # Errors
///
/// A missing document file is recovered with the built-in fallback text, but
/// a provider failure during the one-shot ingest aborts startup.
pub async fn build_state(
    config: &ServerConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generation_provider: Arc<dyn GenerationProvider>,
) -> anyhow::Result<AppState> {
    let (document, source) = load_document(&config.document_path);

    let rag_config = RagConfig::default();
    let chunker =
        Arc::new(FixedSizeChunker::new(rag_config.chunk_size, rag_config.chunk_overlap));

    let pipeline = QaPipeline::builder()
        .config(rag_config)
        .embedding_provider(embedding_provider)
        .generation_provider(generation_provider)
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(chunker)
        .build()
        .context("failed to assemble question-answering pipeline")?;

    pipeline.create_collection(COLLECTION).await.context("failed to create collection")?;
    let chunks = pipeline
        .ingest(COLLECTION, &document)
        .await
        .context("failed to index knowledge document at startup")?;

    info!(
        chunk_count = chunks.len(),
        fallback_mode = source.is_fallback(),
        "knowledge base ready"
    );

    Ok(AppState {
        pipeline: Arc::new(pipeline),
        collection: COLLECTION.to_string(),
        fallback_mode: source.is_fallback(),
    })
}

/// Build the service router: `GET /` and `POST /ask`.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(welcome))
        .route("/ask", post(ask))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the OpenAI-backed state and serve until shutdown.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    // A missing credential is only a warning here: the failure surfaces on
    // the first provider call, which for this service is the startup ingest.
    let api_key = std::env::var(API_KEY_ENV).unwrap_or_else(|_| {
        warn!("{API_KEY_ENV} is not set; provider calls will fail until it is provided");
        String::new()
    });

    let embedding_provider = Arc::new(OpenAIEmbeddingProvider::new(api_key.clone()));
    let generation_provider = Arc::new(OpenAIChatProvider::new(api_key));

    let state = build_state(&config, embedding_provider, generation_provider).await?;
    let app = app_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for finbot server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("finbot listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ───────────────────────────────────────────────────────

/// Request body for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// Response body for `POST /ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// Forward the query into the pipeline and relay its answer.
///
/// Schema validation happens in the `Json` extractor before this handler
/// runs; a malformed body is rejected without touching the providers.
async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<serde_json::Value>)> {
    let result = state.pipeline.answer(&state.collection, &request.query).await.map_err(|e| {
        error!(error = %e, "failed to answer query");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "failed to answer question" })),
        )
    })?;

    Ok(Json(AskResponse { answer: result.answer }))
}
