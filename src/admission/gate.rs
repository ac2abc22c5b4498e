//! The admission gate guarding the signal proxy route.
//!
//! # Responsibilities
//! - Run the policy pipeline in its fixed order: CORS allow-list,
//!   user-agent blocklist, origin/referer corroboration, shared-secret
//!   header, fixed-window rate limit
//! - Short-circuit on the first failing check
//! - Map every rejection to an HTTP status and a stable reason code
//!
//! # Design Decisions
//! - Origin membership is exact string equality (scheme+host); only the
//!   referer check is allowed to prefix-match
//! - Failed identity checks do not consume rate budget, so a client
//!   rejected for its headers cannot exhaust another caller's window

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;

use crate::admission::descriptor::RequestDescriptor;
use crate::admission::rate_limit::{WindowStore, WindowVerdict};
use crate::config::AdmissionConfig;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    CorsOriginDenied,
    SuspiciousUserAgent,
    InvalidOriginOrReferer,
    MissingTrustedHeader,
    RateLimited,
}

impl RejectReason {
    /// HTTP status the surrounding layer responds with.
    pub fn status(&self) -> StatusCode {
        match self {
            RejectReason::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::FORBIDDEN,
        }
    }

    /// Stable machine-readable code for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::CorsOriginDenied => "cors_origin_denied",
            RejectReason::SuspiciousUserAgent => "suspicious_user_agent",
            RejectReason::InvalidOriginOrReferer => "invalid_origin_or_referer",
            RejectReason::MissingTrustedHeader => "missing_trusted_header",
            RejectReason::RateLimited => "rate_limited",
        }
    }

    /// Human-readable message for the JSON error body.
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::CorsOriginDenied => "Origin not allowed",
            RejectReason::SuspiciousUserAgent => "Suspicious user agent",
            RejectReason::InvalidOriginOrReferer => "Invalid origin or referer",
            RejectReason::MissingTrustedHeader => "Missing or invalid client token",
            RejectReason::RateLimited => "Rate limit exceeded",
        }
    }
}

/// Outcome of one admission evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Reject(RejectReason),
}

/// Ordered, short-circuiting pipeline of access policies.
///
/// Holds only immutable policy configuration plus the injected window
/// store; constructing one per server instance keeps the gate unit
/// testable without any HTTP machinery.
pub struct AdmissionGate {
    allowed_origins: HashSet<String>,
    blocked_agents: Vec<String>,
    trusted_secret: String,
    windows: Arc<WindowStore>,
}

impl AdmissionGate {
    pub fn new(config: &AdmissionConfig, windows: Arc<WindowStore>) -> Self {
        Self {
            allowed_origins: config.allowed_origins.iter().cloned().collect(),
            // Patterns are matched case-insensitively; lowercase once here.
            blocked_agents: config
                .blocked_agents
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            trusted_secret: config.trusted_header_secret.clone(),
            windows,
        }
    }

    /// Evaluate one request at `now`.
    ///
    /// Checks run in a fixed order and the first failure wins. Only the
    /// final rate-limit step mutates the window store.
    pub fn evaluate(&self, req: &RequestDescriptor, now: Instant) -> Decision {
        // 1. CORS origin allow-list. An absent origin (same-origin or
        //    server-to-server) passes this stage.
        if let Some(origin) = &req.origin {
            if !self.allowed_origins.contains(origin) {
                return Decision::Reject(RejectReason::CorsOriginDenied);
            }
        }

        // 2. User-agent blocklist, regardless of origin validity.
        if let Some(agent) = &req.user_agent {
            let agent = agent.to_lowercase();
            if self.blocked_agents.iter().any(|p| agent.contains(p)) {
                return Decision::Reject(RejectReason::SuspiciousUserAgent);
            }
        }

        // 3. Origin/referer corroboration: exact origin match, or a
        //    referer prefixed by an allowed origin.
        let origin_ok = req
            .origin
            .as_deref()
            .is_some_and(|o| self.allowed_origins.contains(o));
        let referer_ok = req.referer.as_deref().is_some_and(|r| {
            self.allowed_origins.iter().any(|o| r.starts_with(o.as_str()))
        });
        if !origin_ok && !referer_ok {
            return Decision::Reject(RejectReason::InvalidOriginOrReferer);
        }

        // 4. Shared-secret header: exact, case-sensitive, no trimming.
        if req.trusted_header.as_deref() != Some(self.trusted_secret.as_str()) {
            return Decision::Reject(RejectReason::MissingTrustedHeader);
        }

        // 5. Fixed-window rate limit, reached only after every identity
        //    check passed.
        match self.windows.count(&req.client_key, now) {
            WindowVerdict::Allowed { .. } => Decision::Admit,
            WindowVerdict::Exceeded { count } => {
                tracing::warn!(client = %req.client_key, count, "Rate limit exceeded");
                Decision::Reject(RejectReason::RateLimited)
            }
        }
    }

    /// The injected window store (shared with the sweep task).
    pub fn window_store(&self) -> &Arc<WindowStore> {
        &self.windows
    }
}
