//! Request/result types and the improve pipeline:
//! prompt → backend → section extraction → assembled result.

use serde::Serialize;

use crate::error::Result;
use crate::llm_client::BackendRouter;
use crate::prompt_builder::build_prompt;
use crate::sections::{extract_all, ExtractionResult};

/// Which backend serves a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Cloud,
    /// Local server, with the model name to load
    Local(String),
}

impl ModelChoice {
    /// `selector` equal to `cloud_selector` routes to the cloud; anything
    /// else is treated as a local model name.
    pub fn from_selector(selector: &str, cloud_selector: &str) -> Self {
        if selector == cloud_selector {
            ModelChoice::Cloud
        } else {
            ModelChoice::Local(selector.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImprovementRequest {
    pub original_code: String,
    pub prompt: String,
    pub model_choice: ModelChoice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImprovementResult {
    #[serde(flatten)]
    pub extraction: ExtractionResult,
    pub original_code: String,
}

impl ImprovementResult {
    pub fn assemble(original_code: String, extraction: ExtractionResult) -> Self {
        Self {
            extraction,
            original_code,
        }
    }
}

/// Runs one improvement request end to end
pub struct CodeAssistant {
    backends: BackendRouter,
    cloud_selector: String,
    default_model: String,
}

impl CodeAssistant {
    pub fn new(
        backends: BackendRouter,
        cloud_selector: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            backends,
            cloud_selector: cloud_selector.into(),
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn model_choice(&self, selector: Option<&str>) -> ModelChoice {
        ModelChoice::from_selector(
            selector.unwrap_or(&self.default_model),
            &self.cloud_selector,
        )
    }

    pub async fn improve(&self, request: ImprovementRequest) -> Result<ImprovementResult> {
        let prompt = build_prompt(&request.original_code, &request.prompt);
        let content = self.backends.complete(&prompt, &request.model_choice).await?;

        log::debug!("Backend returned {} bytes of content", content.len());

        Ok(ImprovementResult::assemble(
            request.original_code,
            extract_all(&content),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::llm_client::CompletionBackend;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Backend replying with a fixed text and recording what it was asked
    struct CannedBackend {
        reply: std::result::Result<String, u16>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl CannedBackend {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "Canned"
        }

        async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), model.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(RelayError::Upstream {
                    backend: "Canned",
                    status: *status,
                    body: "backend exploded".to_string(),
                }),
            }
        }
    }

    fn assistant(cloud: Arc<CannedBackend>, local: Arc<CannedBackend>) -> CodeAssistant {
        CodeAssistant::new(
            BackendRouter::new(cloud, "llama3-8b-8192", local),
            "llama3-cloud",
            "phi3-local",
        )
    }

    #[test]
    fn test_model_choice_from_selector() {
        assert_eq!(
            ModelChoice::from_selector("llama3-cloud", "llama3-cloud"),
            ModelChoice::Cloud
        );
        assert_eq!(
            ModelChoice::from_selector("llama3-local", "llama3-cloud"),
            ModelChoice::Local("llama3-local".to_string())
        );
    }

    #[test]
    fn test_missing_selector_uses_default_model() {
        let assistant = assistant(CannedBackend::replying(""), CannedBackend::replying(""));
        assert_eq!(
            assistant.model_choice(None),
            ModelChoice::Local("phi3-local".to_string())
        );
    }

    #[test]
    fn test_assembled_result_field_order() {
        let result = ImprovementResult::assemble(
            "print(1)".to_string(),
            ExtractionResult {
                improved_code: "print(2)".to_string(),
                explanation: "bumped".to_string(),
                additional_suggestions: "None provided.".to_string(),
            },
        );
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"improved_code":"print(2)","explanation":"bumped","additional_suggestions":"None provided.","original_code":"print(1)"}"#
        );
    }

    #[tokio::test]
    async fn test_cloud_selector_routes_to_cloud_model() {
        let cloud = CannedBackend::replying("<improved_code>y</improved_code>");
        let local = CannedBackend::replying("unused");
        let assistant = assistant(cloud.clone(), local.clone());

        let result = assistant
            .improve(ImprovementRequest {
                original_code: "x".to_string(),
                prompt: "rename".to_string(),
                model_choice: assistant.model_choice(Some("llama3-cloud")),
            })
            .await
            .unwrap();

        assert_eq!(result.extraction.improved_code, "y");
        let calls = cloud.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "llama3-8b-8192");
        assert!(calls[0].0.contains("User Request: rename"));
        assert!(local.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_selector_is_passed_as_model_name() {
        let local = CannedBackend::replying("");
        let assistant = assistant(CannedBackend::replying(""), local.clone());

        assistant
            .improve(ImprovementRequest {
                original_code: String::new(),
                prompt: String::new(),
                model_choice: assistant.model_choice(Some("llama3-local")),
            })
            .await
            .unwrap();

        assert_eq!(local.calls.lock().unwrap()[0].1, "llama3-local");
    }

    #[tokio::test]
    async fn test_original_code_is_echoed_verbatim() {
        let assistant = assistant(
            CannedBackend::replying(""),
            CannedBackend::replying("<improved_code>rewritten</improved_code>"),
        );

        let result = assistant
            .improve(ImprovementRequest {
                original_code: "  keep me\n".to_string(),
                prompt: "p".to_string(),
                model_choice: ModelChoice::Local("phi3-local".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.original_code, "  keep me\n");
        assert_eq!(result.extraction.improved_code, "rewritten");
        assert_eq!(result.extraction.additional_suggestions, "None provided.");
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let assistant = assistant(CannedBackend::replying(""), CannedBackend::failing(502));

        let err = assistant
            .improve(ImprovementRequest {
                original_code: "x".to_string(),
                prompt: "p".to_string(),
                model_choice: ModelChoice::Local("phi3-local".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Upstream { status: 502, .. }));
    }
}
