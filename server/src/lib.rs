// Herald HTTP API server
//
// Exposes the query orchestrator over REST: POST /query and GET|HEAD /health

use std::sync::Arc;

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use herald_core::agent::{rejection_message, InMemoryCheckpointStore, ToolCallingAgent};
use herald_core::context_store::{ChromaCloudStore, ContextRetriever};
use herald_core::guardrail::{AllowAll, Classifier, LlmGuardrail};
use herald_core::llm::{embedder_for, Embedder, LlmClient};
use herald_core::tools::native::{RetrieveContextTool, WebSearchTool};
use herald_core::tools::ToolRegistry;
use herald_core::{HeraldConfig, QueryOrchestrator, Result};

pub const DEFAULT_THREAD_ID: &str = "1";

/// Server state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<QueryOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// Body of POST /query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_thread_id")]
    pub thread_id: String,
}

fn default_thread_id() -> String {
    DEFAULT_THREAD_ID.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

/// Build the router with permissive CORS
pub fn router(state: AppState) -> Router {
    Router::new()
        // GET routes also answer HEAD
        .route("/health", get(health_handler))
        .route("/query", post(query_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Keep-alive endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "active".to_string(),
    })
}

/// Run one query through the orchestrator.
///
/// Refusals and internal failures are returned as text with status 200.
async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    info!(target: "server", thread_id = %request.thread_id, "Query received");
    let response = state
        .orchestrator
        .answer(&request.query, &request.thread_id)
        .await;
    Json(QueryResponse { response })
}

/// Construct the process-wide services from configuration
pub fn build_orchestrator(config: &HeraldConfig) -> Result<QueryOrchestrator> {
    let llm = Arc::new(LlmClient::new(config.llm.clone())?);

    let embedder = embedder_for(config.chroma.embedder, llm.clone())?;
    info!(target: "server", embedder = %embedder.model_name(), "Query embedder selected");
    let store = Arc::new(ChromaCloudStore::new(config.chroma.clone(), embedder)?);
    let retriever = ContextRetriever::new(store, config.chroma.collection.clone());

    let tools = ToolRegistry::with_timeout(config.tool_timeout());
    tools.register(Arc::new(
        RetrieveContextTool::new(retriever).with_default_n_results(config.chroma.n_results),
    ));
    if config.search.enabled {
        tools.register(Arc::new(WebSearchTool::new(config.search.clone())));
    }

    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let agent = Arc::new(ToolCallingAgent::new(
        llm.clone(),
        tools,
        checkpoints,
        &config.agent,
    ));

    let classifier: Arc<dyn Classifier> = if config.guardrail.enabled {
        Arc::new(LlmGuardrail::new(llm, &config.agent.subject_name))
    } else {
        info!(target: "server", "Guardrail disabled; all queries reach the agent");
        Arc::new(AllowAll)
    };

    info!(
        target: "server",
        model = %config.llm.model,
        collection = %config.chroma.collection,
        web_search = config.search.enabled,
        guardrail = config.guardrail.enabled,
        "Services initialized"
    );

    Ok(QueryOrchestrator::new(
        classifier,
        agent,
        rejection_message(&config.agent.subject_name),
    ))
}
