//! Route handlers for the auth/licensing endpoints and the protected
//! signal proxy.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::{AttemptRecord, TraderRecord};
use crate::upstream::{SignalQuery, UpstreamError};

/// Liveness banner, kept compatible with the original service root.
pub async fn root() -> &'static str {
    "Auth server is running"
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyKeyRequest {
    #[serde(default)]
    key: Option<String>,
}

pub async fn verify_key(
    State(state): State<AppState>,
    Json(body): Json<VerifyKeyRequest>,
) -> Response {
    let Some(key) = body.key.filter(|k| !k.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "error": "Missing key" })),
        )
            .into_response();
    };

    let valid = state.keys.is_valid(key.trim());
    Json(json!({ "valid": valid })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let (Some(username), Some(password)) = (
        body.username.filter(|u| !u.is_empty()),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing username or password" })),
        )
            .into_response();
    };

    let user = state.users.authenticate(&username, &password);

    let attempt = AttemptRecord::new(&username, user.is_some(), &addr.ip().to_string());
    if let Err(e) = state.attempts.record(&attempt) {
        // The attempt log is best-effort; the login outcome stands.
        tracing::error!(error = %e, "Failed to record login attempt");
    }

    match user {
        Some(user) => {
            tracing::info!(username = %user.username, "Login succeeded");
            Json(json!({ "success": true, "user": { "username": user.username } })).into_response()
        }
        None => {
            tracing::warn!(username = %username, client = %addr.ip(), "Login failed");
            Json(json!({ "success": false, "error": "Invalid credentials" })).into_response()
        }
    }
}

pub async fn reload_data(State(state): State<AppState>) -> Response {
    let result = state
        .keys
        .reload()
        .and_then(|()| state.users.reload())
        .and_then(|()| state.traders.reload());

    match result {
        Ok(()) => {
            Json(json!({ "success": true, "message": "Data reloaded from disk" })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to reload data" })),
            )
                .into_response()
        }
    }
}

pub async fn list_traders(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "traders": state.traders.list() }))
}

#[derive(Debug, Deserialize)]
pub struct AddTraderRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    account: Option<String>,
}

pub async fn add_trader(
    State(state): State<AppState>,
    Json(body): Json<AddTraderRequest>,
) -> Response {
    let (Some(name), Some(account)) = (
        body.name.filter(|n| !n.is_empty()),
        body.account.filter(|a| !a.is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing name or account" })),
        )
            .into_response();
    };

    match state.traders.add(TraderRecord { name, account }) {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist trader");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to save trader" })),
            )
                .into_response()
        }
    }
}

/// The protected route: reached only through the admission gate.
pub async fn get_signals(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(query) = SignalQuery::from_params(&params) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing required parameters" })),
        )
            .into_response();
    };

    match state.signals.fetch(&query).await {
        Ok(body) => {
            metrics::record_upstream("ok");
            body.into_response()
        }
        Err(UpstreamError::Status { status, details }) => {
            metrics::record_upstream("bad_status");
            tracing::warn!(upstream_status = status, "Signal API returned an error status");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": format!("Signal API returned status {}", status),
                    "details": details,
                })),
            )
                .into_response()
        }
        Err(UpstreamError::Transport(e)) => {
            metrics::record_upstream("transport_error");
            tracing::error!(error = %e, "Upstream fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}
