//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, limits > 0)
//! - Check the admission policy is complete when enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, returning every violation found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "not a valid socket address",
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "listener.max_body_bytes",
            "must be greater than zero",
        ));
    }

    if config.admission.enabled {
        if config.admission.allowed_origins.is_empty() {
            errors.push(ValidationError::new(
                "admission.allowed_origins",
                "at least one origin is required when the gate is enabled",
            ));
        }
        for origin in &config.admission.allowed_origins {
            if Url::parse(origin).is_err() {
                errors.push(ValidationError::new(
                    "admission.allowed_origins",
                    format!("'{origin}' is not a valid origin URL"),
                ));
            }
        }
        if config.admission.trusted_header_secret.is_empty() {
            errors.push(ValidationError::new(
                "admission.trusted_header_secret",
                "required when the gate is enabled",
            ));
        }
        if config.admission.trusted_header_name.is_empty() {
            errors.push(ValidationError::new(
                "admission.trusted_header_name",
                "must be non-empty",
            ));
        }
        // An empty pattern would match every user agent.
        if config.admission.blocked_agents.iter().any(|p| p.is_empty()) {
            errors.push(ValidationError::new(
                "admission.blocked_agents",
                "patterns must be non-empty",
            ));
        }
        if config.admission.window_secs == 0 {
            errors.push(ValidationError::new(
                "admission.window_secs",
                "must be greater than zero",
            ));
        }
        if config.admission.max_requests_per_window == 0 {
            errors.push(ValidationError::new(
                "admission.max_requests_per_window",
                "must be greater than zero",
            ));
        }
        if config.admission.sweep_interval_secs == 0 {
            errors.push(ValidationError::new(
                "admission.sweep_interval_secs",
                "must be greater than zero",
            ));
        }
        if config.admission.stale_after_windows == 0 {
            errors.push(ValidationError::new(
                "admission.stale_after_windows",
                "must be greater than zero",
            ));
        }
    }

    match Url::parse(&config.upstream.signal_api_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::new(
            "upstream.signal_api_url",
            "must be a valid http(s) URL",
        )),
    }
    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a valid socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
