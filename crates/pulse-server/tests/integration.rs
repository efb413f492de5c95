//! End-to-end integration tests using real HTTP and WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{Value, json};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use pulse_server::config::ServerConfig;
use pulse_server::server::PulseServer;
use pulse_store::ContactStore;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Boot a test server and return its base URL, WS URL, handle, and store.
async fn boot_server() -> (String, String, Arc<PulseServer>, ContactStore) {
    let pool = pulse_store::new_in_memory(&pulse_store::ConnectionConfig::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        let _ = pulse_store::run_migrations(&conn).unwrap();
    }
    let contacts = ContactStore::new(pool);

    let config = ServerConfig {
        port: 0, // auto-assign
        tick_interval_ms: 100,
        ..ServerConfig::default()
    };
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let server = Arc::new(PulseServer::new(config, contacts.clone(), metrics_handle));

    let (addr, _handle) = server.listen().await.unwrap();
    let base_url = format!("http://{addr}");
    let ws_url = format!("ws://{addr}/ws");

    (base_url, ws_url, server, contacts)
}

async fn connect(url: &str) -> WsStream {
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

/// Read the next text frame as JSON, skipping control frames.
async fn read_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Poll until the registry reports `expected` connections.
async fn wait_for_connection_count(server: &PulseServer, expected: usize) {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    loop {
        if server.registry().connection_count().await == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "registry never reached {expected} connections"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_number_frame_pushed_on_connect() {
    let (_base, ws_url, server, _contacts) = boot_server().await;
    let mut ws = connect(&ws_url).await;

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["event"], "number");
    let n = frame["data"].as_u64().expect("data is a number");
    assert!(n < 10);

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_frames_keep_coming() {
    let (_base, ws_url, server, _contacts) = boot_server().await;
    let mut ws = connect(&ws_url).await;

    for _ in 0..5 {
        let frame = read_json(&mut ws).await;
        assert_eq!(frame["event"], "number");
        assert!(frame["data"].as_u64().unwrap() < 10);
    }

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_each_client_gets_its_own_feed() {
    let (_base, ws_url, server, _contacts) = boot_server().await;
    let mut ws1 = connect(&ws_url).await;
    let mut ws2 = connect(&ws_url).await;

    wait_for_connection_count(&server, 2).await;

    let f1 = read_json(&mut ws1).await;
    let f2 = read_json(&mut ws2).await;
    assert_eq!(f1["event"], "number");
    assert_eq!(f2["event"], "number");

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_disconnect_clears_registry() {
    let (_base, ws_url, server, _contacts) = boot_server().await;
    let ws = connect(&ws_url).await;

    wait_for_connection_count(&server, 1).await;
    drop(ws);
    wait_for_connection_count(&server, 0).await;

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_shutdown_closes_connections() {
    let (_base, ws_url, server, _contacts) = boot_server().await;
    let mut ws = connect(&ws_url).await;
    wait_for_connection_count(&server, 1).await;

    server.shutdown().shutdown();

    // The stream must end within the timeout once shutdown cancels the
    // session.
    let closed = timeout(TIMEOUT, async {
        loop {
            match ws.next().await {
                None => break,
                Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "connection did not close on shutdown");
}

#[tokio::test]
async fn e2e_add_two_numbers() {
    let (base, _ws, server, _contacts) = boot_server().await;

    let resp = reqwest::get(format!("{base}/addTwoNumber?n1=3&n2=4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], 7);

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_add_rejects_non_numeric() {
    let (base, _ws, server, _contacts) = boot_server().await;

    let resp = reqwest::get(format!("{base}/addTwoNumber?n1=abc&n2=4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("n1"));
    assert_eq!(body["status"], 400);

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_add_rejects_missing_operand() {
    let (base, _ws, server, _contacts) = boot_server().await;

    let resp = reqwest::get(format!("{base}/addTwoNumber?n2=4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_contact_round_trip() {
    let (base, _ws, server, contacts) = boot_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/contact"))
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "hello",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Hurray!!! your Email and message saved successfully"
    );

    assert_eq!(contacts.count().unwrap(), 1);
    let saved = contacts.list(10).unwrap();
    assert_eq!(saved[0].name, "Ada");
    assert_eq!(saved[0].email, "ada@example.com");
    assert_eq!(saved[0].message, "hello");

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_contact_empty_object_is_accepted() {
    let (base, _ws, server, contacts) = boot_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/contact"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(contacts.count().unwrap(), 1);
    let saved = contacts.list(10).unwrap();
    assert_eq!(saved[0].name, "");
    assert_eq!(saved[0].email, "");

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_contact_rejects_malformed_json() {
    let (base, _ws, server, contacts) = boot_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/contact"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(contacts.count().unwrap(), 0);

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_health_reports_connections() {
    let (base, ws_url, server, _contacts) = boot_server().await;
    let _ws = connect(&ws_url).await;
    wait_for_connection_count(&server, 1).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 1);
    assert!(body["uptime_secs"].is_number());

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_metrics_endpoint_renders() {
    let (base, _ws, server, _contacts) = boot_server().await;

    let resp = reqwest::get(format!("{base}/metrics")).await.unwrap();
    assert_eq!(resp.status(), 200);

    server.shutdown().shutdown();
}

#[tokio::test]
async fn e2e_front_page_served() {
    let (base, _ws, server, _contacts) = boot_server().await;

    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains("<!DOCTYPE html>"));

    server.shutdown().shutdown();
}
