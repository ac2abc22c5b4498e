//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (admission gate, tracing, limits, request ID)
//! - Load the flat-file stores and build the upstream client
//! - Spawn the rate-window sweep task
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admission::{AdmissionGate, WindowStore};
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::middleware::{admission_middleware, AdmissionState};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::store::{AttemptLog, KeyStore, StoreError, TraderStore, UserStore};
use crate::upstream::SignalClient;

/// Errors building a server from configuration.
#[derive(Debug, Error)]
pub enum ServerInitError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<KeyStore>,
    pub users: Arc<UserStore>,
    pub traders: Arc<TraderStore>,
    pub attempts: Arc<AttemptLog>,
    pub signals: Arc<SignalClient>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    windows: Arc<WindowStore>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerInitError> {
        let keys = Arc::new(KeyStore::load(&config.store.keys_path)?);
        let users = Arc::new(UserStore::load(&config.store.users_path)?);
        let traders = Arc::new(TraderStore::load(&config.store.traders_path)?);
        let attempts = Arc::new(AttemptLog::open(&config.store.attempts_path)?);
        let signals = Arc::new(SignalClient::new(&config.upstream)?);

        let windows = Arc::new(WindowStore::new(
            Duration::from_secs(config.admission.window_secs),
            config.admission.max_requests_per_window,
        ));
        let gate = Arc::new(AdmissionGate::new(&config.admission, windows.clone()));

        let state = AppState {
            keys,
            users,
            traders,
            attempts,
            signals,
        };
        let admission = AdmissionState {
            gate,
            trusted_header_name: config.admission.trusted_header_name.clone(),
            enabled: config.admission.enabled,
        };

        let router = Self::build_router(&config, state, admission);
        Ok(Self {
            router,
            config,
            windows,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState, admission: AdmissionState) -> Router {
        // Only the signal proxy sits behind the gate; the auth/licensing
        // endpoints stay open like the service this fronts.
        let protected = Router::new()
            .route("/api/signals", get(handlers::get_signals))
            .route_layer(middleware::from_fn_with_state(
                admission,
                admission_middleware,
            ));

        Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health))
            .route("/verify-key", post(handlers::verify_key))
            .route("/login", post(handlers::login))
            .route("/reload-data", post(handlers::reload_data))
            .route(
                "/traders",
                get(handlers::list_traders).post(handlers::add_trader),
            )
            .merge(protected)
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.admission.enabled {
            let windows = self.windows.clone();
            let interval = Duration::from_secs(self.config.admission.sweep_interval_secs);
            let stale_after = self.config.admission.stale_after_windows;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await; // first tick fires immediately
                loop {
                    ticker.tick().await;
                    windows.sweep(Instant::now(), stale_after);
                    metrics::record_window_count(windows.len());
                    tracing::debug!(windows = windows.len(), "Swept rate-limit windows");
                }
            });
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Record method/status/latency for every request that matched a route.
async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(req).await;

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        route = %route,
        status = response.status().as_u16(),
        "Request completed"
    );
    metrics::record_request(&method, response.status().as_u16(), &route, start);
    response
}
