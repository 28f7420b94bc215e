// code-assist-rs/src/config.rs
//
// Relay configuration, read once at startup and passed to the backends.
//
// Configuration (.env file):
// - GROQ_API_KEY: bearer token for the cloud backend
// - CLOUD_API_URL: chat completions endpoint (defaults to Groq)
// - CLOUD_MODEL: model id sent to the cloud backend
// - CLOUD_SELECTOR: inbound `model` value that routes to the cloud
// - CLOUD_TEMPERATURE: sampling temperature for the cloud backend
// - OLLAMA_SERVICE_ADDR / OLLAMA_SERVICE_PORT: local inference server
// - DEFAULT_MODEL: selector used when a request omits `model`
// - STATIC_DIR / TEMPLATES_DIR: page assets served next to the API

use std::fmt;
use std::path::PathBuf;

use config_rs::{get_env_or, get_env_string, ServiceConfig};

pub const DEFAULT_CLOUD_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CLOUD_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_CLOUD_SELECTOR: &str = "llama3-cloud";
pub const DEFAULT_LOCAL_MODEL: &str = "phi3-local";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;
pub const DEFAULT_SERVICE_PORT: u16 = 5000;

#[derive(Clone)]
pub struct RelayConfig {
    pub cloud_api_key: String,
    pub cloud_api_url: String,
    pub cloud_model: String,
    pub cloud_selector: String,
    pub cloud_temperature: f32,
    /// Base URL of the local server, without a trailing slash
    pub local_base_url: String,
    pub default_model: String,
    pub static_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            cloud_api_key: String::new(),
            cloud_api_url: DEFAULT_CLOUD_API_URL.to_string(),
            cloud_model: DEFAULT_CLOUD_MODEL.to_string(),
            cloud_selector: DEFAULT_CLOUD_SELECTOR.to_string(),
            cloud_temperature: 0.7,
            local_base_url: format!("http://localhost:{}", DEFAULT_OLLAMA_PORT),
            default_model: DEFAULT_LOCAL_MODEL.to_string(),
            static_dir: PathBuf::from("static"),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            cloud_api_key: get_env_string("GROQ_API_KEY", "").trim().to_string(),
            cloud_api_url: get_env_string("CLOUD_API_URL", DEFAULT_CLOUD_API_URL),
            cloud_model: get_env_string("CLOUD_MODEL", DEFAULT_CLOUD_MODEL),
            cloud_selector: get_env_string("CLOUD_SELECTOR", DEFAULT_CLOUD_SELECTOR),
            cloud_temperature: get_env_or("CLOUD_TEMPERATURE", 0.7),
            local_base_url: ServiceConfig::new(crate::SERVICE_NAME)
                .get_client_address("OLLAMA", DEFAULT_OLLAMA_PORT),
            default_model: get_env_string("DEFAULT_MODEL", DEFAULT_LOCAL_MODEL),
            static_dir: PathBuf::from(get_env_string("STATIC_DIR", "static")),
            templates_dir: PathBuf::from(get_env_string("TEMPLATES_DIR", "templates")),
        }
    }

    pub fn has_cloud_api_key(&self) -> bool {
        !self.cloud_api_key.is_empty()
    }
}

// The API key never reaches the logs
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field(
                "cloud_api_key",
                &if self.has_cloud_api_key() { "<set>" } else { "<unset>" },
            )
            .field("cloud_api_url", &self.cloud_api_url)
            .field("cloud_model", &self.cloud_model)
            .field("cloud_selector", &self.cloud_selector)
            .field("cloud_temperature", &self.cloud_temperature)
            .field("local_base_url", &self.local_base_url)
            .field("default_model", &self.default_model)
            .field("static_dir", &self.static_dir)
            .field("templates_dir", &self.templates_dir)
            .finish()
    }
}
