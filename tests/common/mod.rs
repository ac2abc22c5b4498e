//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use signal_gateway::config::GatewayConfig;

pub const TEST_ORIGIN: &str = "http://app.test";
pub const TEST_SECRET: &str = "it-token-123";

/// Start a programmable mock signal API that answers every connection
/// with the (status, body) the closure produces.
#[allow(dead_code)]
pub async fn start_upstream<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Write the flat store files a gateway needs into a fresh temp dir.
#[allow(dead_code)]
pub fn write_store_files(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("signal-gateway-it")
        .join(test_name);
    std::fs::create_dir_all(&dir).unwrap();

    std::fs::write(
        dir.join("keys.json"),
        r#"{"validKeys": ["KEY-ALPHA-1", "KEY-BETA-2"]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("users.json"),
        r#"{"users": [{"username": "alice", "password": "wonderland"}]}"#,
    )
    .unwrap();
    std::fs::remove_file(dir.join("traders.json")).unwrap_or_default();
    std::fs::remove_file(dir.join("attempts.jsonl")).unwrap_or_default();

    dir
}

/// Build a gateway config pointing at the temp store dir and the mock
/// upstream, with the admission gate enabled.
#[allow(dead_code)]
pub fn test_config(dir: &Path, bind: SocketAddr, upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = bind.to_string();

    config.store.keys_path = dir.join("keys.json").display().to_string();
    config.store.users_path = dir.join("users.json").display().to_string();
    config.store.traders_path = dir.join("traders.json").display().to_string();
    config.store.attempts_path = dir.join("attempts.jsonl").display().to_string();

    config.upstream.signal_api_url = format!("http://{}/", upstream);
    config.upstream.request_timeout_secs = 5;

    config.admission.enabled = true;
    config.admission.allowed_origins = vec![TEST_ORIGIN.to_string()];
    config.admission.trusted_header_secret = TEST_SECRET.to_string();
    config.admission.blocked_agents = vec!["curl".to_string(), "python-requests".to_string()];
    config.admission.window_secs = 60;
    config.admission.max_requests_per_window = 30;

    config.observability.metrics_enabled = false;

    config
}
