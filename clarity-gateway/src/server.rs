use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clarity_core::ProviderType;
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::agent::Agent;
use crate::agent::clarity::AGENT_VERSION;
use crate::state::AppState;

/// Characters of the topic kept in request logs.
const TOPIC_LOG_CHARS: usize = 50;

/// Analysis request from HTTP API
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub topic: String,
    #[serde(default)]
    pub llm_provider: Option<ProviderType>,
}

/// Query parameters for `GET /agent/info`
#[derive(Debug, Deserialize)]
pub struct AgentInfoQuery {
    #[serde(default)]
    pub provider: Option<ProviderType>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub available_providers: Vec<ProviderType>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: ProviderType,
    pub model: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderStatus>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn internal(error: impl Into<String>) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: error.into(),
            }),
        )
            .into_response()
    }
}

/// Run the HTTP server until Ctrl-C
pub async fn run(state: Arc<AppState>, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/", get(health_handler))
        .route("/analyze", post(analyze_handler))
        .route("/agent/info", get(agent_info_handler))
        .route("/providers", get(providers_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!("Unhandled error: {}", detail);
    ErrorResponse::internal("Internal server error")
}

/// Health check handler - GET /
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: AGENT_VERSION.to_string(),
        available_providers: state.available_providers(),
    })
}

/// Analysis handler - POST /analyze
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Response {
    let request_id = format!("req_{}", uuid::Uuid::new_v4());
    let provider = request.llm_provider.unwrap_or_else(|| state.default_provider());
    let topic_preview: String = request.topic.chars().take(TOPIC_LOG_CHARS).collect();
    info!(%request_id, %provider, "Analyzing topic: {}...", topic_preview);

    let agent = match state.agent(Some(provider)) {
        Ok(agent) => agent,
        Err(e) => {
            error!(%request_id, "Error creating LLM provider {}: {}", provider, e);
            return ErrorResponse::internal(format!("Error configuring provider {}", provider));
        }
    };

    let result = agent.process(&request.topic).await;
    info!(%request_id, "Analysis completed. Success: {}", result.success);

    Json(result).into_response()
}

/// Agent info handler - GET /agent/info?provider=
async fn agent_info_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AgentInfoQuery>,
) -> Response {
    let provider = query.provider.unwrap_or_else(|| state.default_provider());
    match state.agent(Some(provider)) {
        Ok(agent) => Json(agent.info()).into_response(),
        Err(e) => {
            error!("Error getting agent info: {}", e);
            ErrorResponse::internal(format!("Error configuring provider {}", provider))
        }
    }
}

/// Provider listing handler - GET /providers
async fn providers_handler(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let providers = state
        .available_providers()
        .into_iter()
        .map(|name| ProviderStatus {
            name,
            model: state.config.model(name).to_string(),
            status: "available".to_string(),
        })
        .collect();

    Json(ProvidersResponse { providers })
}
