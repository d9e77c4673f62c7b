//! End-to-end filtering tests for the gateway.

use std::net::SocketAddr;
use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

mod common;

const REJECT_BODY: &str = "Your request cannot be processed. Please contact a support.";
const P3P_VALUE: &str = "CP=\"IDC DSP COR ADM DEVi TAIi PSA PSD IVAi IVDi CONi HIS OUR IND CNT\"";

#[tokio::test]
async fn test_clean_request_forwarded_with_intact_body() {
    let upstream_addr: SocketAddr = "127.0.0.1:28411".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28412".parse().unwrap();

    let hits = common::start_echo_upstream(upstream_addr).await;
    let shutdown = common::start_guard(proxy_addr, upstream_addr).await;

    let res = common::client()
        .post(format!("http://{}/x", proxy_addr))
        .body("hello")
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "hello");
    assert_eq!(hits.load(Ordering::SeqCst), 1, "Upstream invoked exactly once");

    shutdown.trigger();
}

#[tokio::test]
async fn test_dangerous_query_string_rejected() {
    let upstream_addr: SocketAddr = "127.0.0.1:28421".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28422".parse().unwrap();

    let hits = common::start_echo_upstream(upstream_addr).await;
    let shutdown = common::start_guard(proxy_addr, upstream_addr).await;

    let res = common::client()
        .get(format!("http://{}/search?q=%3Cscript%3E", proxy_addr))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), StatusCode::BAD_REQUEST.as_u16());
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(res.headers().get("p3p").unwrap(), P3P_VALUE);
    assert_eq!(res.text().await.unwrap(), REJECT_BODY);
    assert_eq!(hits.load(Ordering::SeqCst), 0, "Upstream never invoked");

    shutdown.trigger();
}

#[tokio::test]
async fn test_dangerous_json_body_rejected() {
    let upstream_addr: SocketAddr = "127.0.0.1:28431".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28432".parse().unwrap();

    let hits = common::start_echo_upstream(upstream_addr).await;
    let shutdown = common::start_guard(proxy_addr, upstream_addr).await;

    let res = common::client()
        .post(format!("http://{}/profile", proxy_addr))
        .json(&serde_json::json!({ "name": "<img src=x onerror=y>" }))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 400);
    assert_eq!(res.text().await.unwrap(), REJECT_BODY);
    assert_eq!(hits.load(Ordering::SeqCst), 0, "Upstream never sees the body");

    shutdown.trigger();
}

#[tokio::test]
async fn test_named_entity_body_allowed() {
    let upstream_addr: SocketAddr = "127.0.0.1:28441".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28442".parse().unwrap();

    let hits = common::start_echo_upstream(upstream_addr).await;
    let shutdown = common::start_guard(proxy_addr, upstream_addr).await;

    let res = common::client()
        .post(format!("http://{}/notes", proxy_addr))
        .body("&copy;")
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "&copy;");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_numeric_entity_query_rejected() {
    let upstream_addr: SocketAddr = "127.0.0.1:28451".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28452".parse().unwrap();

    let hits = common::start_echo_upstream(upstream_addr).await;
    let shutdown = common::start_guard(proxy_addr, upstream_addr).await;

    // %26%23 decodes to "&#", the numeric character-reference prefix.
    let res = common::client()
        .get(format!("http://{}/search?q=%26%2360%3B", proxy_addr))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 400);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_raw_dangerous_request_target_rejected() {
    let upstream_addr: SocketAddr = "127.0.0.1:28471".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28472".parse().unwrap();

    let hits = common::start_echo_upstream(upstream_addr).await;
    let shutdown = common::start_guard(proxy_addr, upstream_addr).await;

    // reqwest (and any strict client) percent-encodes `<`, so drive the raw
    // request target over TCP. The gateway's HTTP parser refuses the target
    // before routing; either way the contract is 400 and no upstream call.
    let mut stream = tokio::net::TcpStream::connect(proxy_addr).await.unwrap();
    stream
        .write_all(b"GET /x<script> HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let response = String::from_utf8_lossy(&buf);

    assert!(
        response.starts_with("HTTP/1.1 400"),
        "Expected 400 for dangerous request target, got: {}",
        response.lines().next().unwrap_or("<empty>")
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0, "Upstream never invoked");

    shutdown.trigger();
}

#[tokio::test]
async fn test_large_clean_body_restored_byte_identical() {
    let upstream_addr: SocketAddr = "127.0.0.1:28461".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28462".parse().unwrap();

    let hits = common::start_echo_upstream(upstream_addr).await;
    let shutdown = common::start_guard(proxy_addr, upstream_addr).await;

    let payload = "0123456789abcdef".repeat(4096); // 64 KiB
    let res = common::client()
        .post(format!("http://{}/upload", proxy_addr))
        .body(payload.clone())
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), payload);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}
