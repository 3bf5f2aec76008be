//! # logscan - Integration Tests
//!
//! End-to-end tests over the public API:
//! raw upload bytes -> RecordSet -> detectors -> ScanPage, plus the HTTP
//! router driven in-process.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use logscan::api::{build_router, ScanPage};
use logscan::detection::{scan_all, Detector};
use logscan::log_sources::{parse_log_file, RecordSet};
use logscan::{BotType, ScannerConfig};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const E2E_LINE: &str = r#"10.0.0.5 - - [10/Oct/2023:13:55:36 +0000] "GET /wp-login.php HTTP/1.1" 401 512 "-" "curl/7.68.0" example.com 10.0.0.1"#;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";

fn log_line(ip: &str, method: &str, path: &str, status: u16, ua: &str) -> String {
    format!(
        r#"{} - - [10/Oct/2023:13:55:36 +0000] "{} {} HTTP/1.1" {} 1024 "https://example.com/" "{}" example.com 203.0.113.10"#,
        ip, method, path, status, ua
    )
}

/// A small mixed access log: benign traffic, one example of each attack,
/// and some lines the parser must drop.
fn mixed_log() -> String {
    [
        log_line("198.51.100.7", "GET", "/", 200, BROWSER_UA),
        log_line("198.51.100.8", "GET", "/search?q=1%27%20UNION%20SELECT%20password%20FROM%20users--", 200, BROWSER_UA),
        "this line is not an access log entry".to_string(),
        log_line("198.51.100.9", "GET", "/static/%2e%2e%2fetc/passwd", 404, BROWSER_UA),
        log_line("198.51.100.10", "GET", "/", 200, "Mozilla/5.0 (compatible; bingbot/2.0)"),
        log_line("198.51.100.11", "POST", "/admin/login", 403, BROWSER_UA),
        log_line("198.51.100.12", "GET", "/xmlrpc.php", 405, BROWSER_UA),
        log_line("192.168.1.20", "GET", "/dashboard", 200, BROWSER_UA),
        log_line("198.51.100.13", "GET", "/api/v1/items", 502, BROWSER_UA),
        log_line("198.51.100.14", "GET", "/blog/?x=CONCAT(1,2)", 200, BROWSER_UA),
        String::new(),
    ]
    .join("\n")
}

fn flagged_ips(detector: Detector, records: &RecordSet) -> Vec<String> {
    detector
        .detect(records)
        .findings()
        .iter()
        .map(|f| f.ip.clone())
        .collect()
}

fn multipart_request(uri: &str, field: &str, content: &str) -> Request<Body> {
    let boundary = "logscan-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"access.log\"\r\nContent-Type: text/plain\r\n\r\n{c}\r\n--{b}--\r\n",
        b = boundary,
        f = field,
        c = content,
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .expect("request")
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    send_with(ScannerConfig::default(), request).await
}

async fn send_with(config: ScannerConfig, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(config).oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_e2e_example_line() {
    let records = parse_log_file(E2E_LINE.as_bytes());
    assert_eq!(records.len(), 1);
    let record = &records.records()[0];
    assert_eq!(record.ip, "10.0.0.5");
    assert_eq!(record.status, "401");
    assert_eq!(record.path, "/wp-login.php");
    assert_eq!(record.server_ip, "10.0.0.1");

    for detector in [Detector::BruteForce, Detector::WpProbe, Detector::Bot, Detector::InternalIp] {
        assert_eq!(flagged_ips(detector, &records), ["10.0.0.5"], "{}", detector);
    }
    for detector in [Detector::Error, Detector::PathTraversal] {
        assert!(flagged_ips(detector, &records).is_empty(), "{}", detector);
    }

    let bots = Detector::Bot.detect(&records);
    assert_eq!(bots.findings()[0].bot_type, Some(BotType::ClientLibraryBot));
}

#[test]
fn test_mixed_log_per_detector() {
    let records = parse_log_file(mixed_log().as_bytes());
    assert_eq!(records.len(), 9);

    assert_eq!(flagged_ips(Detector::SqlInjection, &records), ["198.51.100.8"]);
    assert_eq!(flagged_ips(Detector::PathTraversal, &records), ["198.51.100.9"]);
    assert_eq!(flagged_ips(Detector::LfiRfi, &records), ["198.51.100.9"]);
    assert_eq!(flagged_ips(Detector::Bot, &records), ["198.51.100.10"]);
    assert_eq!(flagged_ips(Detector::BruteForce, &records), ["198.51.100.11"]);
    assert_eq!(flagged_ips(Detector::WpProbe, &records), ["198.51.100.12"]);
    assert_eq!(flagged_ips(Detector::InternalIp, &records), ["192.168.1.20"]);
    assert_eq!(
        flagged_ips(Detector::Error, &records),
        ["198.51.100.9", "198.51.100.11", "198.51.100.13"]
    );
}

#[test]
fn test_sql_injection_annotation() {
    let records = parse_log_file(mixed_log().as_bytes());
    let result = Detector::SqlInjection.detect(&records);
    assert_eq!(result.columns().last(), Some(&"matched_patterns"));

    let patterns = result.findings()[0].matched_patterns.clone().unwrap_or_default();
    assert!(patterns.contains(&"union_select".to_string()));
    assert!(patterns.contains(&"select_from".to_string()));
}

#[test]
fn test_internal_ip_broad_172_prefix() {
    let records = parse_log_file(log_line("172.200.1.1", "GET", "/", 200, BROWSER_UA).as_bytes());
    assert_eq!(flagged_ips(Detector::InternalIp, &records), ["172.200.1.1"]);
}

#[test]
fn test_scan_all_covers_every_detector() {
    let records = parse_log_file(mixed_log().as_bytes());
    let results = scan_all(&records);
    let order: Vec<Detector> = results.iter().map(|r| r.detector()).collect();
    assert_eq!(order, Detector::ALL);
    assert!(results.iter().all(|r| !r.is_empty()));
}

#[test]
fn test_binary_garbage_upload() {
    let raw: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    let records = RecordSet::parse(&raw);
    assert!(records.is_empty());
    for result in scan_all(&records) {
        assert!(result.is_empty());
        let page = ScanPage::build(&result, 500, 0);
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
    }
}

#[test]
fn test_timestamps_render_in_page() {
    let records = parse_log_file(mixed_log().as_bytes());
    let page = ScanPage::build(&Detector::Bot.detect(&records), 10, 0);
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["results"]["timestamp"][0], "2023-10-10T13:55:36+00:00");
    assert_eq!(json["results"]["bot_type"][0], "Crawler Bot");
    assert!(json["results"].get("method").is_none());
}

// ---------------------------------------------------------------------------
// HTTP API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_http_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_http_detectors_listing() {
    let request = Request::builder().uri("/api/detectors").body(Body::empty()).unwrap();
    let (status, json) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["detectors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["sql-injection", "path-traversal", "bots", "lfi-rfi", "wp-probe", "brute-force", "errors", "internal-ip"]
    );
}

#[tokio::test]
async fn test_http_scan_paginates() {
    let request = multipart_request("/api/scan/errors?limit=2&offset=1", "file", &mixed_log());
    let (status, json) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);
    assert_eq!(json["is_more"], false);
    assert_eq!(
        json["results"]["ip"],
        serde_json::json!(["198.51.100.11", "198.51.100.13"])
    );
    assert_eq!(json["results"]["status"], serde_json::json!(["403", "502"]));
}

#[tokio::test]
async fn test_http_scan_bots_default_page() {
    let request = multipart_request("/api/scan/bots", "file", E2E_LINE);
    let (status, json) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"]["bot_type"][0], "Client Library Bot");
}

#[tokio::test]
async fn test_http_unknown_detector() {
    let request = multipart_request("/api/scan/xss", "file", E2E_LINE);
    let (status, json) = send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["detail"].as_str().unwrap().contains("xss"));
}

#[tokio::test]
async fn test_http_zero_limit_rejected() {
    let request = multipart_request("/api/scan/errors?limit=0", "file", E2E_LINE);
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_http_missing_file_field() {
    let request = multipart_request("/api/scan/errors", "upload", E2E_LINE);
    let (status, json) = send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["detail"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_http_oversized_upload() {
    let mut config = ScannerConfig::default();
    config.server.max_upload_bytes = 256;
    let request = multipart_request("/api/scan/errors", "file", &mixed_log());
    let (status, _) = send_with(config, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_http_malformed_query_is_json_422() {
    for uri in ["/api/scan/errors?limit=abc", "/api/scan/errors?offset=-1"] {
        let (status, json) = send(multipart_request(uri, "file", E2E_LINE)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert!(json["detail"].as_str().unwrap().contains("query"), "{}", uri);
    }
}

#[tokio::test]
async fn test_http_non_multipart_body_is_json_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/scan/errors")
        .header("content-type", "text/plain")
        .body(Body::from(E2E_LINE))
        .unwrap();
    let (status, json) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].is_string());
}
