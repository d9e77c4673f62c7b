//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, routing::any, Router};
use tokio::net::TcpListener;

use xss_guard::{GuardConfig, GuardServer, Shutdown};

/// Start an upstream that echoes the request body back and counts hits.
///
/// The returned counter observes how many requests actually reached the
/// upstream, which is how the tests assert the downstream handler was (or
/// was not) invoked.
pub async fn start_echo_upstream(addr: SocketAddr) -> Arc<AtomicU32> {
    let hits = Arc::new(AtomicU32::new(0));
    let listener = TcpListener::bind(addr).await.unwrap();

    let counter = hits.clone();
    let handler = move |req: Request<Body>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap()
        }
    };

    let app = Router::new()
        .route("/", any(handler.clone()))
        .route("/{*path}", any(handler));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    hits
}

/// Start the gateway on `proxy_addr`, forwarding to `upstream_addr`.
///
/// Returns the shutdown coordinator; dropping it leaves the server running
/// for the remainder of the test process, so tests trigger it on exit.
pub async fn start_guard(proxy_addr: SocketAddr, upstream_addr: SocketAddr) -> Shutdown {
    let mut config = GuardConfig::default();
    config.listener.bind_address = proxy_addr.to_string();
    config.upstream.address = upstream_addr.to_string();

    let shutdown = Shutdown::new();
    let server = GuardServer::new(config);
    let listener = TcpListener::bind(proxy_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the listener a beat to start accepting.
    tokio::time::sleep(Duration::from_millis(200)).await;

    shutdown
}

/// A reqwest client that never pools connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
