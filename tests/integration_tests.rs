// Integration tests: HTTP endpoints

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{FakeSource, composer, sample};
use hoststats::models::StatsSnapshot;
use hoststats::routes;
use std::sync::Arc;

fn test_server(source: FakeSource) -> TestServer {
    let app = routes::app(Arc::new(composer(source)));
    TestServer::new(app)
}

fn two_samples() -> FakeSource {
    FakeSource::scripted(vec![sample(1000, 2000, 0, 0, 0.0), sample(3000, 2500, 0, 0, 2.0)])
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = test_server(two_samples());
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("/api/stats"));
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = test_server(two_samples());
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("hoststats")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_stats_endpoint_returns_snapshot() {
    let server = test_server(two_samples());
    let response = server.get("/api/stats").await;
    response.assert_status_ok();
    let snapshot: StatsSnapshot = response.json();
    assert_eq!(snapshot.network.upload_bps, Some(1000.0));
    assert_eq!(snapshot.network.download_bps, Some(250.0));
    assert_eq!(snapshot.disk.read_bps, Some(0.0));
    assert_eq!(snapshot.network.interfaces["eth0"].packets_recv, 25);
}

#[tokio::test]
async fn test_stats_json_shape() {
    let server = test_server(two_samples());
    let json: serde_json::Value = server.get("/api/stats").await.json();
    assert!(json["gpu"].is_null());
    assert!(json["battery"].is_null());
    assert_eq!(json["memory"]["human"]["total"], "8.0 GB");
    assert_eq!(json["disk"]["human"]["free"], "768.0 GB");
    assert_eq!(json["cpu"]["logical_cores"], 2);
    assert_eq!(json["processes_top"][0]["name"], "cargo");
    assert_eq!(json["system"]["uptime_seconds"], 3600);
    assert!(json["network"]["interfaces"]["eth0"]["bytes_sent"].is_u64());
}

#[tokio::test]
async fn test_stats_endpoint_exhausted_counters_is_500() {
    let server = test_server(two_samples());
    server.get("/api/stats").await.assert_status_ok();
    let response = server.get("/api/stats").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"]["code"], 500);
    assert!(
        json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("I/O counters"))
    );
}

#[tokio::test]
async fn test_stats_endpoint_memory_failure_is_500() {
    let mut source = two_samples();
    source.fail_memory = true;
    let server = test_server(source);
    let response = server.get("/api/stats").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
