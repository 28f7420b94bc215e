//! config-rs/lib.rs
//! Shared configuration utilities for consistent service configuration
//! Provides standardized functions for port/address management and typed
//! environment lookups

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Load variables from a `.env` file in the working directory, if present.
///
/// Returns `true` when a file was found and loaded.
pub fn load_dotenv() -> bool {
    match dotenv::dotenv() {
        Ok(path) => {
            log::debug!("Loaded environment from {}", path.display());
            true
        }
        Err(_) => false,
    }
}

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is unset or does not parse.
pub fn get_env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            log::warn!("Invalid value in {}, using default", name);
            default
        }),
        Err(_) => default,
    }
}

/// Read a string environment variable with a default
pub fn get_env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "CODE_ASSIST", "OLLAMA")
/// * `default_port` - The default port to use if not specified in environment
///
/// # Returns
/// The port number to use for the service
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    env::var(&var_name)
        .unwrap_or_else(|_| default_port.to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        })
}

/// Create a SocketAddr for binding a service
///
/// `{SERVICE}_SERVICE_ADDR` may hold either `host:port` or `http://host:port`.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let stripped = addr_str
            .strip_prefix("http://")
            .or_else(|| addr_str.strip_prefix("https://"))
            .unwrap_or(&addr_str);
        if let Ok(addr) = stripped.parse::<SocketAddr>() {
            return addr;
        }
        log::warn!("Invalid address format in {}, using default", var_name);
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Get client connection address for connecting to a service
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "OLLAMA")
/// * `default_port` - The default port to use if not specified in environment
/// * `host` - Optional host to use if not specified in environment (default: "localhost")
///
/// # Returns
/// A connection string for the client to connect to the service, without a
/// trailing slash
pub fn get_client_address(service_name: &str, default_port: u16, host: Option<&str>) -> String {
    let addr_var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());
    let port_var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());

    if let Ok(addr) = env::var(&addr_var_name) {
        return addr.trim_end_matches('/').to_string();
    }

    let port = env::var(&port_var_name)
        .unwrap_or_else(|_| default_port.to_string())
        .parse::<u16>()
        .unwrap_or(default_port);

    let host = host.unwrap_or("localhost");
    format!("http://{}:{}", host, port)
}

/// Per-service view over the helpers above
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    service_name: String,
}

impl ServiceConfig {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.replace('-', "_").to_uppercase(),
        }
    }

    pub fn get_bind_address(&self, default_port: u16) -> SocketAddr {
        get_bind_address(&self.service_name, default_port)
    }

    /// Address of another service this one talks to
    pub fn get_client_address(&self, target_service: &str, default_port: u16) -> String {
        get_client_address(&target_service.replace('-', "_"), default_port, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_service_port() {
        std::env::set_var("PORTTEST_SERVICE_PORT", "9000");
        assert_eq!(get_service_port("PORTTEST", 8000), 9000);

        std::env::set_var("BADPORT_SERVICE_PORT", "not-a-port");
        assert_eq!(get_service_port("BADPORT", 8000), 8000);

        std::env::remove_var("UNKNOWN_SERVICE_PORT");
        assert_eq!(get_service_port("UNKNOWN", 8000), 8000);
    }

    #[test]
    fn test_get_bind_address() {
        std::env::set_var("BINDTEST_SERVICE_ADDR", "http://127.0.0.1:7777");
        assert_eq!(
            get_bind_address("BINDTEST", 5000),
            "127.0.0.1:7777".parse::<SocketAddr>().unwrap()
        );

        std::env::remove_var("BINDDEFAULT_SERVICE_ADDR");
        std::env::remove_var("BINDDEFAULT_SERVICE_PORT");
        assert_eq!(
            get_bind_address("BINDDEFAULT", 5000),
            "0.0.0.0:5000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_get_client_address() {
        // Test with full address override
        std::env::set_var("CLIENTTEST_SERVICE_ADDR", "http://example.com:9000/");
        assert_eq!(get_client_address("CLIENTTEST", 8000, None), "http://example.com:9000");

        // Test with port override
        std::env::set_var("CLIENTPORT_SERVICE_PORT", "9000");
        assert_eq!(get_client_address("CLIENTPORT", 8000, None), "http://localhost:9000");

        // Test with default
        std::env::remove_var("NOCLIENT_SERVICE_ADDR");
        std::env::remove_var("NOCLIENT_SERVICE_PORT");
        assert_eq!(get_client_address("NOCLIENT", 8000, None), "http://localhost:8000");

        // Test with custom host
        assert_eq!(
            get_client_address("NOCLIENT", 8000, Some("service.local")),
            "http://service.local:8000"
        );
    }

    #[test]
    fn test_get_env_or() {
        std::env::set_var("ENVOR_TEMPERATURE", "0.2");
        assert_eq!(get_env_or("ENVOR_TEMPERATURE", 0.7_f32), 0.2);

        std::env::set_var("ENVOR_BROKEN", "warm");
        assert_eq!(get_env_or("ENVOR_BROKEN", 0.7_f32), 0.7);

        std::env::remove_var("ENVOR_MISSING");
        assert_eq!(get_env_string("ENVOR_MISSING", "fallback"), "fallback");
    }

    #[test]
    fn test_service_config_normalizes_name() {
        std::env::set_var("NORM_TEST_SERVICE_PORT", "6100");
        assert_eq!(
            ServiceConfig::new("norm-test").get_bind_address(5000),
            "0.0.0.0:6100".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_service_config_client_address() {
        let config = ServiceConfig::new("code-assist");

        std::env::set_var("LOCAL_LLM_SERVICE_ADDR", "http://gpu-box:11434/");
        assert_eq!(
            config.get_client_address("local-llm", 11434),
            "http://gpu-box:11434"
        );

        std::env::remove_var("NO_LLM_SERVICE_ADDR");
        std::env::remove_var("NO_LLM_SERVICE_PORT");
        assert_eq!(
            config.get_client_address("no-llm", 11434),
            "http://localhost:11434"
        );
    }
}
