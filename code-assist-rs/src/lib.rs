//! Code assist relay
//!
//! Accepts `{code, prompt, model}` on `POST /process_code`, asks the
//! selected LLM backend for an improvement and returns the improved code,
//! explanation and suggestions parsed out of the reply.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};

pub mod config;
pub mod error;
pub mod improvement;
pub mod llm_client;
pub mod prompt_builder;
pub mod sections;


use config::RelayConfig;
use error::RelayError;
use improvement::{CodeAssistant, ImprovementRequest, ImprovementResult};
use llm_client::BackendRouter;

/// Default maximum request payload size (10MB)
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

pub const SERVICE_NAME: &str = "code-assist";

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// `POST /process_code` request body (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct ProcessCodeRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub status: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    assistant: Arc<CodeAssistant>,
}

impl AppState {
    pub fn new(assistant: CodeAssistant) -> Self {
        Self {
            assistant: Arc::new(assistant),
        }
    }

    /// State wired to the real backends described by `config`
    pub fn from_config(client: reqwest::Client, config: &RelayConfig) -> Self {
        Self::new(CodeAssistant::new(
            BackendRouter::from_config(client, config),
            config.cloud_selector.clone(),
            config.default_model.clone(),
        ))
    }
}

/// POST /process_code - improve a snippet through the selected backend
async fn process_code_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessCodeRequest>, JsonRejection>,
) -> Result<Json<ImprovementResult>, RelayError> {
    let Json(payload) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge(rejection.body_text())
        } else {
            RelayError::InvalidRequest(rejection.body_text())
        }
    })?;

    let model_choice = state.assistant.model_choice(payload.model.as_deref());
    log::info!(
        "Received prompt: {}... for model: {}",
        payload.prompt.chars().take(50).collect::<String>(),
        payload.model.as_deref().unwrap_or(state.assistant.default_model())
    );

    let result = state
        .assistant
        .improve(ImprovementRequest {
            original_code: payload.code,
            prompt: payload.prompt,
            model_choice,
        })
        .await?;

    Ok(Json(result))
}

/// GET /health - Health check endpoint
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        service_name: SERVICE_NAME.to_string(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
        status: "SERVING".to_string(),
    })
}

/// API routes only
pub fn api_router(state: AppState) -> Router {
    Lazy::force(&START_TIME);

    Router::new()
        .route("/process_code", post(process_code_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_SIZE))
        .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// API routes plus the index page and static assets
pub fn create_router(state: AppState, static_dir: &Path, templates_dir: &Path) -> Router {
    api_router(state)
        .route_service("/", ServeFile::new(templates_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
}
