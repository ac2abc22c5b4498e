//! Admission gate middleware.
//! Guards the signal proxy route.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::admission::{AdmissionGate, ClientKey, Decision, RequestDescriptor};
use crate::observability::metrics;

/// State required by the admission middleware.
#[derive(Clone)]
pub struct AdmissionState {
    pub gate: Arc<AdmissionGate>,
    pub trusted_header_name: String,
    pub enabled: bool,
}

pub async fn admission_middleware(
    State(state): State<AdmissionState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // Gate disabled: passthrough mode.
    if !state.enabled {
        return next.run(req).await;
    }

    let descriptor = descriptor_from_headers(req.headers(), &state.trusted_header_name, addr);

    match state.gate.evaluate(&descriptor, Instant::now()) {
        Decision::Admit => next.run(req).await,
        Decision::Reject(reason) => {
            tracing::warn!(
                client = %descriptor.client_key,
                reason = reason.code(),
                "Request rejected by admission gate"
            );
            metrics::record_rejected(reason.code());
            (reason.status(), Json(json!({ "error": reason.message() }))).into_response()
        }
    }
}

/// Build the typed descriptor from raw request headers.
fn descriptor_from_headers(
    headers: &HeaderMap,
    trusted_header_name: &str,
    addr: SocketAddr,
) -> RequestDescriptor {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };

    RequestDescriptor {
        origin: header("origin"),
        referer: header("referer"),
        user_agent: header("user-agent"),
        trusted_header: header(trusted_header_name),
        client_key: ClientKey::derive(
            addr.ip(),
            headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()),
        ),
    }
}
