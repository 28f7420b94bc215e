// code-assist-rs/src/main.rs
// Code Assist relay - HTTP entry point
// Port 5000 by default (CODE_ASSIST_SERVICE_PORT / CODE_ASSIST_SERVICE_ADDR)

use code_assist::config::{RelayConfig, DEFAULT_SERVICE_PORT};
use code_assist::error::RelayError;
use code_assist::llm_client::{build_http_client, LocalBackend};
use code_assist::{create_router, AppState, SERVICE_NAME};
use config_rs::ServiceConfig;

/// Log what the local inference server has installed. Never fails startup.
async fn check_local_server(backend: &LocalBackend) {
    match backend.list_models().await {
        Ok(models) if models.is_empty() => {
            log::warn!(
                "Local server at {} is running but has no models installed",
                backend.base_url()
            );
        }
        Ok(models) => {
            log::info!("Local server at {} is running with models:", backend.base_url());
            for model in models {
                log::info!(" - {}", model);
            }
        }
        Err(RelayError::Transport { .. }) => {
            log::warn!(
                "Unable to connect to local server at {}. Local models will fail.",
                backend.base_url()
            );
        }
        Err(err) => {
            log::warn!("Local server not responding: {}", err);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    config_rs::load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let service_config = ServiceConfig::new(SERVICE_NAME);
    let addr = service_config.get_bind_address(DEFAULT_SERVICE_PORT);

    let config = RelayConfig::from_env();
    log::info!("Relay configuration: {:?}", config);
    if !config.has_cloud_api_key() {
        log::warn!(
            "GROQ_API_KEY is not set; requests for '{}' will fail",
            config.cloud_selector
        );
    }

    let client = build_http_client()?;
    check_local_server(&LocalBackend::new(client.clone(), &config)).await;

    let state = AppState::from_config(client, &config);
    let app = create_router(state, &config.static_dir, &config.templates_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| RelayError::Startup(format!("Failed to bind {}: {}", addr, err)))?;

    log::info!("Code assist relay starting on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
