//! signal-gateway
//!
//! Authentication/licensing service fronting a third-party signal API.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                SIGNAL GATEWAY                 │
//!                    │                                               │
//!   Client Request   │  ┌────────┐   ┌───────────┐   ┌──────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ admission │──▶│ upstream │──┼──▶ Signal API
//!                    │  │ server │   │   gate    │   │  client  │  │
//!                    │  └───┬────┘   └───────────┘   └──────────┘  │
//!                    │      │                                       │
//!                    │      ▼                                       │
//!                    │  ┌────────────────────────────────────────┐ │
//!                    │  │ store: keys.json / users.json /         │ │
//!                    │  │ traders.json / login attempt log        │ │
//!                    │  └────────────────────────────────────────┘ │
//!                    │                                               │
//!                    │  Cross-cutting: config, observability,        │
//!                    │  lifecycle (graceful shutdown)                │
//!                    └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signal_gateway::config::loader::load_config;
use signal_gateway::config::GatewayConfig;
use signal_gateway::http::HttpServer;
use signal_gateway::lifecycle::Shutdown;

#[derive(Parser, Debug)]
#[command(name = "signal-gateway")]
#[command(about = "Auth/licensing gateway in front of a signal API", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("signal-gateway v0.1.0 starting");

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(port) = args.port {
        let mut addr: SocketAddr = config.listener.bind_address.parse()?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        admission_enabled = config.admission.enabled,
        window_secs = config.admission.window_secs,
        max_requests = config.admission.max_requests_per_window,
        upstream = %config.upstream.signal_api_url,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            signal_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
