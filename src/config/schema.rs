//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from config
//! files, and every field has a default so minimal configs work.

use serde::{Deserialize, Serialize};

/// Root configuration for the signal gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Admission gate policy for the protected signal route.
    pub admission: AdmissionConfig,

    /// Upstream signal API settings.
    pub upstream: UpstreamConfig,

    /// Flat-file store locations.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Admission gate policy.
///
/// Disabled by default (passthrough mode); deployments enable it and
/// supply their origin allow-list and shared secret.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Enable the gate in front of the signal route.
    pub enabled: bool,

    /// Origins admitted by the CORS check; membership is exact string
    /// equality on scheme+host.
    pub allowed_origins: Vec<String>,

    /// Name of the trusted-client header.
    pub trusted_header_name: String,

    /// Shared secret the trusted-client header must equal exactly.
    pub trusted_header_secret: String,

    /// Case-insensitive substrings matched against the User-Agent header.
    pub blocked_agents: Vec<String>,

    /// Rate-limit window duration in seconds.
    pub window_secs: u64,

    /// Maximum requests admitted per window per client.
    pub max_requests_per_window: u32,

    /// Interval between sweeps of idle rate windows, in seconds.
    pub sweep_interval_secs: u64,

    /// A window idle for this many durations is dropped by the sweep.
    pub stale_after_windows: u32,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            trusted_header_name: "x-client-token".to_string(),
            trusted_header_secret: String::new(),
            blocked_agents: vec![
                "curl".to_string(),
                "wget".to_string(),
                "python-requests".to_string(),
                "httpie".to_string(),
                "postman".to_string(),
                "go-http-client".to_string(),
            ],
            window_secs: 60,
            max_requests_per_window: 30,
            sweep_interval_secs: 300,
            stale_after_windows: 3,
        }
    }
}

/// Upstream signal API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the third-party signal API.
    pub signal_api_url: String,

    /// Upstream request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            signal_api_url: "https://quotexapi.itssrishu07.workers.dev/".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Locations of the flat JSON files backing the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// License key file (`{"validKeys": [...]}`).
    pub keys_path: String,

    /// User credential file (`{"users": [...]}`).
    pub users_path: String,

    /// Registered trader file (`{"traders": [...]}`).
    pub traders_path: String,

    /// Login attempt log (one JSON object per line, append-only).
    pub attempts_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            keys_path: "keys.json".to_string(),
            users_path: "users.json".to_string(),
            traders_path: "traders.json".to_string(),
            attempts_path: "login_attempts.jsonl".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse_from_empty_toml() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert!(!config.admission.enabled);
        assert_eq!(config.admission.window_secs, 60);
        assert_eq!(config.admission.max_requests_per_window, 30);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [admission]
            enabled = true
            allowed_origins = ["https://app.example.com"]
            trusted_header_secret = "s3cret"
            "#,
        )
        .unwrap();

        assert!(config.admission.enabled);
        assert_eq!(config.admission.trusted_header_name, "x-client-token");
        assert_eq!(config.admission.window_secs, 60);
        assert!(config.admission.blocked_agents.iter().any(|p| p == "curl"));
    }
}
