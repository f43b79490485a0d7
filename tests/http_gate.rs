//! End-to-end identification over a real TCP listener.

use std::sync::Arc;

use client_gate::config::GateConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{http_client, start_gate, Sources, CIDR_HEADER, KEY_HEADER};

async fn get(url: String, headers: &[(&str, &str)]) -> (StatusCode, reqwest::header::HeaderMap, Value) {
    let mut request = http_client().get(url);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = request.send().await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    (status, headers, response.json().await.unwrap())
}

#[tokio::test]
async fn test_api_key_endpoint() {
    let sources = Sources::sample();
    let (addr, shutdown) = start_gate(Arc::new(sources.resolver()), GateConfig::default()).await;
    let url = format!("http://{}/data", addr);

    let (status, _, body) = get(url.clone(), &[("x-api-key", "12345-ABCDE")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Welcome ClientA", "classification": "premium"}));

    let (status, _, body) = get(url.clone(), &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"valid": false, "error": {"message": "API key missing"}}));

    let (status, _, body) = get(url.clone(), &[("x-api-key", "00000-INVALID")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"valid": false, "error": {"message": "Invalid API Key"}}));

    // Keys are matched verbatim.
    let (status, _, _) = get(url, &[("x-api-key", "12345-abcde")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    shutdown.trigger();
}

#[tokio::test]
async fn test_ip_endpoint_with_forwarded_for() {
    let sources = Sources::sample();
    let (addr, shutdown) = start_gate(Arc::new(sources.resolver()), GateConfig::default()).await;
    let url = format!("http://{}/ip-data", addr);

    let (status, _, body) = get(url.clone(), &[("x-forwarded-for", "192.168.1.50")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "Welcome Corporate HQ",
            "classification": "premium",
            "matched_cidr": "192.168.1.0/24",
            "client_ip": "192.168.1.50",
        })
    );

    // Only the first hop counts.
    let (status, _, body) = get(url.clone(), &[("x-forwarded-for", "10.0.5.100, 8.8.8.8")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched_cidr"], "10.0.0.0/16");

    let (status, _, body) = get(url.clone(), &[("x-forwarded-for", "2001:db8:abcd::1")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome IPv6 Client");
    assert_eq!(body["matched_cidr"], "2001:db8:abcd::/48");

    let (status, _, body) = get(url.clone(), &[("x-forwarded-for", "8.8.8.8")]).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"valid": false, "error": {"message": "IP address not authorized"}}));

    let (status, _, body) = get(url.clone(), &[("x-forwarded-for", "not-an-ip")]).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Invalid IP address format");

    // A present but empty header does not fall back to the peer.
    let (status, _, body) = get(url, &[("x-forwarded-for", " , 10.0.0.1")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"valid": false, "error": {"message": "Could not determine client IP"}}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_ip_endpoint_falls_back_to_peer() {
    // The sample networks do not cover loopback.
    let sources = Sources::sample();
    let (addr, shutdown) = start_gate(Arc::new(sources.resolver()), GateConfig::default()).await;
    let (status, _, body) = get(format!("http://{}/ip-data", addr), &[]).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "IP address not authorized");
    shutdown.trigger();

    let local = Sources::new(KEY_HEADER, &format!("{}\nLocal Development,standard,127.0.0.0/8\n", CIDR_HEADER));
    let mut config = GateConfig::default();
    config.client_ip.trust_forwarded_for = false;
    let (addr, shutdown) = start_gate(Arc::new(local.resolver()), config).await;

    let (status, _, body) = get(format!("http://{}/ip-data", addr), &[("x-forwarded-for", "8.8.8.8")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome Local Development");
    assert_eq!(body["client_ip"], "127.0.0.1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let sources = Sources::sample();
    let (addr, shutdown) = start_gate(Arc::new(sources.resolver()), GateConfig::default()).await;

    let (_, headers, _) = get(format!("http://{}/health", addr), &[("x-request-id", "trace-me-42")]).await;
    assert_eq!(headers["x-request-id"], "trace-me-42");

    let (_, headers, _) = get(format!("http://{}/data", addr), &[]).await;
    let generated = headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok(), "{}", generated);

    shutdown.trigger();
}

#[tokio::test]
async fn test_reload_is_visible_to_new_requests() {
    let sources = Sources::sample();
    let resolver = Arc::new(sources.resolver());
    let (addr, shutdown) = start_gate(resolver.clone(), GateConfig::default()).await;
    let url = format!("http://{}/data", addr);

    assert_eq!(get(url.clone(), &[("x-api-key", "ROTATED-1")]).await.0, StatusCode::UNAUTHORIZED);

    sources.replace(&sources.keys, &format!("{}\nROTATED-1,ClientA,premium\n", KEY_HEADER));
    resolver.reload();

    assert_eq!(get(url.clone(), &[("x-api-key", "ROTATED-1")]).await.0, StatusCode::OK);
    assert_eq!(get(url, &[("x-api-key", "12345-ABCDE")]).await.0, StatusCode::UNAUTHORIZED);

    shutdown.trigger();
}
