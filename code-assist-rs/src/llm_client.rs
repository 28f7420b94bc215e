// code-assist-rs/src/llm_client.rs
//
// HTTP clients for the two LLM backends
//
// This module provides:
// - A `CompletionBackend` capability shared by every backend
// - `CloudBackend`: OpenAI-compatible chat completions (Groq by default)
// - `LocalBackend`: an Ollama-style generate endpoint
// - `BackendRouter`: picks the backend for a `ModelChoice`
//
// Failed calls are never retried and no request timeout is configured, so
// caller latency equals upstream latency.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::improvement::ModelChoice;

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Display name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Send `prompt` and return the generated text
    async fn complete(&self, prompt: &str, model: &str) -> Result<String>;
}

/// Build the shared HTTP client. No request timeout is configured.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("code-assist/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| RelayError::Startup(format!("Failed to build HTTP client: {}", err)))
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

// Non-2xx responses become `Upstream` errors carrying the body text
async fn ensure_success(backend: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|err| format!("<unreadable response body: {}>", err));
    log::warn!("{} API returned status {}", backend, status.as_u16());

    Err(RelayError::Upstream {
        backend,
        status: status.as_u16(),
        body,
    })
}

fn transport(backend: &'static str) -> impl FnOnce(reqwest::Error) -> RelayError {
    move |source| RelayError::Transport { backend, source }
}

fn invalid_response(backend: &'static str) -> impl FnOnce(reqwest::Error) -> RelayError {
    move |err| RelayError::InvalidResponse {
        backend,
        message: err.to_string(),
    }
}

/// OpenAI-compatible chat completions backend
#[derive(Clone)]
pub struct CloudBackend {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl CloudBackend {
    pub fn new(client: Client, config: &RelayConfig) -> Self {
        Self {
            client,
            api_url: config.cloud_api_url.clone(),
            api_key: config.cloud_api_key.clone(),
            model: config.cloud_model.clone(),
            temperature: config.cloud_temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for CloudBackend {
    fn name(&self) -> &'static str {
        "Groq"
    }

    async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(RelayError::Configuration(
                "cloud API key is not set (GROQ_API_KEY)".to_string(),
            ));
        }

        let request_body = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };

        log::info!("Using {} cloud API ({})", self.name(), model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(transport(self.name()))?;

        let response = ensure_success(self.name(), response).await?;
        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(invalid_response(self.name()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::InvalidResponse {
                backend: self.name(),
                message: "no completion choices returned".to_string(),
            })?;

        choice.message.content.ok_or_else(|| RelayError::InvalidResponse {
            backend: self.name(),
            message: "completion choice has no content".to_string(),
        })
    }
}

/// Locally hosted Ollama-style backend
#[derive(Debug, Clone)]
pub struct LocalBackend {
    client: Client,
    base_url: String,
}

impl LocalBackend {
    pub fn new(client: Client, config: &RelayConfig) -> Self {
        Self {
            client,
            base_url: config.local_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models installed on the local server
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(transport(self.name()))?;

        let response = ensure_success(self.name(), response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(invalid_response(self.name()))?;

        Ok(tags.models.into_iter().map(|entry| entry.name).collect())
    }
}

#[async_trait]
impl CompletionBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        log::info!("Using local {} API ({})", self.name(), model);

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(transport(self.name()))?;

        let response = ensure_success(self.name(), response).await?;
        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(invalid_response(self.name()))?;

        Ok(generated.response)
    }
}

/// Dispatches a `ModelChoice` to the backend that serves it
#[derive(Clone)]
pub struct BackendRouter {
    cloud: Arc<dyn CompletionBackend>,
    cloud_model: String,
    local: Arc<dyn CompletionBackend>,
}

impl BackendRouter {
    pub fn new(
        cloud: Arc<dyn CompletionBackend>,
        cloud_model: impl Into<String>,
        local: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            cloud,
            cloud_model: cloud_model.into(),
            local,
        }
    }

    /// Router over the real HTTP backends described by `config`
    pub fn from_config(client: Client, config: &RelayConfig) -> Self {
        let cloud = CloudBackend::new(client.clone(), config);
        let cloud_model = cloud.model().to_string();
        Self::new(
            Arc::new(cloud),
            cloud_model,
            Arc::new(LocalBackend::new(client, config)),
        )
    }

    /// Backend and the model name it should be asked for
    pub fn route<'a>(&'a self, choice: &'a ModelChoice) -> (&'a dyn CompletionBackend, &'a str) {
        match choice {
            ModelChoice::Cloud => (self.cloud.as_ref(), self.cloud_model.as_str()),
            ModelChoice::Local(model) => (self.local.as_ref(), model.as_str()),
        }
    }

    pub async fn complete(&self, prompt: &str, choice: &ModelChoice) -> Result<String> {
        let (backend, model) = self.route(choice);
        backend.complete(prompt, model).await
    }
}
