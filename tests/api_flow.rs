//! End-to-end tests for the auth/licensing endpoints.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use signal_gateway::http::HttpServer;
use signal_gateway::lifecycle::Shutdown;

mod common;

async fn spawn_gateway(config: signal_gateway::GatewayConfig) -> Shutdown {
    let bind: SocketAddr = config.listener.bind_address.parse().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind(bind).await.unwrap();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    shutdown
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let upstream_addr: SocketAddr = "127.0.0.1:28581".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28582".parse().unwrap();

    let dir = common::write_store_files("root_health");
    let config = common::test_config(&dir, proxy_addr, upstream_addr);
    let shutdown = spawn_gateway(config).await;

    let client = client();

    let res = client
        .get(format!("http://{}/", proxy_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Auth server is running");

    let res = client
        .get(format!("http://{}/health", proxy_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_verify_key_flow() {
    let upstream_addr: SocketAddr = "127.0.0.1:28583".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28584".parse().unwrap();

    let dir = common::write_store_files("verify_key");
    let config = common::test_config(&dir, proxy_addr, upstream_addr);
    let shutdown = spawn_gateway(config).await;

    let client = client();
    let url = format!("http://{}/verify-key", proxy_addr);

    let res = client
        .post(&url)
        .json(&json!({ "key": "KEY-ALPHA-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], true);

    // Client-supplied whitespace is trimmed before lookup.
    let res = client
        .post(&url)
        .json(&json!({ "key": "  KEY-ALPHA-1  " }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], true);

    let res = client
        .post(&url)
        .json(&json!({ "key": "KEY-UNKNOWN" }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], false);

    let res = client.post(&url).json(&json!({})).send().await.unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], false);
    assert_eq!(body["error"], "Missing key");

    shutdown.trigger();
}

#[tokio::test]
async fn test_login_and_attempt_log() {
    let upstream_addr: SocketAddr = "127.0.0.1:28585".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28586".parse().unwrap();

    let dir = common::write_store_files("login");
    let config = common::test_config(&dir, proxy_addr, upstream_addr);
    let attempts_path = config.store.attempts_path.clone();
    let shutdown = spawn_gateway(config).await;

    let client = client();
    let url = format!("http://{}/login", proxy_addr);

    let res = client
        .post(&url)
        .json(&json!({ "username": "alice", "password": "wonderland" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "alice");

    let res = client
        .post(&url)
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid credentials");

    let res = client
        .post(&url)
        .json(&json!({ "username": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing username or password");

    // Both real attempts were logged; the 400 was not an attempt.
    let content = std::fs::read_to_string(&attempts_path).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["username"], "alice");
    assert_eq!(lines[0]["success"], true);
    assert_eq!(lines[1]["success"], false);

    shutdown.trigger();
}

#[tokio::test]
async fn test_reload_data_picks_up_disk_changes() {
    let upstream_addr: SocketAddr = "127.0.0.1:28587".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28588".parse().unwrap();

    let dir = common::write_store_files("reload");
    let config = common::test_config(&dir, proxy_addr, upstream_addr);
    let keys_path = config.store.keys_path.clone();
    let shutdown = spawn_gateway(config).await;

    let client = client();
    let verify_url = format!("http://{}/verify-key", proxy_addr);

    let res = client
        .post(&verify_url)
        .json(&json!({ "key": "KEY-NEW" }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], false);

    std::fs::write(&keys_path, r#"{"validKeys": ["KEY-NEW"]}"#).unwrap();

    let res = client
        .post(format!("http://{}/reload-data", proxy_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);

    let res = client
        .post(&verify_url)
        .json(&json!({ "key": "KEY-NEW" }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], true);

    shutdown.trigger();
}

#[tokio::test]
async fn test_traders_register_and_list() {
    let upstream_addr: SocketAddr = "127.0.0.1:28589".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28590".parse().unwrap();

    let dir = common::write_store_files("traders");
    let config = common::test_config(&dir, proxy_addr, upstream_addr);
    let shutdown = spawn_gateway(config).await;

    let client = client();
    let url = format!("http://{}/traders", proxy_addr);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["traders"].as_array().unwrap().len(), 0);

    let res = client
        .post(&url)
        .json(&json!({ "name": "alice", "account": "ACC-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let res = client
        .post(&url)
        .json(&json!({ "name": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client.get(&url).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    let traders = body["traders"].as_array().unwrap();
    assert_eq!(traders.len(), 1);
    assert_eq!(traders[0]["name"], "alice");
    assert_eq!(traders[0]["account"], "ACC-1");

    shutdown.trigger();
}
