//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::header;
use axum::routing::post;
use axum::Router;
use futures_util::stream;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use optimizer_gateway::config::GatewayConfig;
use optimizer_gateway::http::server::AppState;
use optimizer_gateway::GatewayServer;

/// Start a mock generation API that streams fixed chunks from
/// POST /chat/completions, one write per chunk.
pub async fn start_mock_generator(chunks: &'static [&'static str]) -> SocketAddr {
    let app = Router::new().route(
        "/chat/completions",
        post(move || async move {
            let body = Body::from_stream(stream::iter(
                chunks
                    .iter()
                    .map(|chunk| Ok::<_, std::convert::Infallible>(*chunk)),
            ));
            ([(header::CONTENT_TYPE, "text/event-stream")], body)
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Development config pointed at the mock generator, with a fresh
/// in-process rate limit store per gateway so tests stay isolated.
pub fn test_config(upstream_addr: SocketAddr, max_requests: u32) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.rate_limit.max_requests = max_requests;
    config.upstream.base_url = format!("http://{upstream_addr}");
    config
}

/// Spawn a gateway on an ephemeral port and return its address.
pub async fn spawn_gateway(config: GatewayConfig) -> SocketAddr {
    let state = AppState::from_config(&config).await.unwrap();
    let server = GatewayServer::new(&config, state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

/// A payload that passes every validation rule.
pub fn valid_payload() -> Value {
    json!({
        "jobDescription": "J".repeat(80),
        "currentRole": "Backend Engineer",
        "targetRole": "Staff Engineer",
        "resumeText": "R".repeat(80),
        "website": "",
        "formStartedAt": 1_700_000_000_000_i64,
    })
}

/// Call GET /session and return the minted cookie pair
/// (`session_token=...`) ready for a Cookie header.
pub async fn obtain_session(client: &reqwest::Client, addr: SocketAddr) -> String {
    let response = client
        .get(format!("http://{addr}/session"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let set_cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("session cookie should be minted")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}
