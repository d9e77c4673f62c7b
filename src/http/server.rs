//! HTTP server setup and upstream forwarding.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all forward handler
//! - Wire up middleware (anti-XSS filter, timeout, tracing)
//! - Serve with graceful shutdown
//! - Forward allowed requests to the configured upstream

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, Scheme},
        Request, StatusCode, Uri,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GuardConfig;
use crate::filter::anti_xss::{anti_xss_middleware, AntiXssState};
use crate::filter::headers::ResponseHeaderPolicy;
use crate::observability::metrics;

/// Application state injected into the forward handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// HTTP server hosting the filter in front of the upstream.
pub struct GuardServer {
    router: Router,
    config: GuardConfig,
}

impl GuardServer {
    /// Create a new server from a validated configuration.
    ///
    /// Panics if the upstream address is not a valid authority; config
    /// validation rules this out before construction.
    pub fn new(config: GuardConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let upstream: Authority = config
            .upstream
            .address
            .parse()
            .expect("upstream address checked by config validation");

        let state = AppState { client, upstream };
        let router = Self::build_router(&config, state);

        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GuardConfig, state: AppState) -> Router {
        let filter_state = AntiXssState {
            header_policy: ResponseHeaderPolicy::p3p(),
            max_body_bytes: config.limits.max_scan_body_bytes,
        };

        Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                filter_state,
                anti_xss_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}

/// Forward an allowed request to the upstream, relaying the response.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    parts.uri = Uri::from_parts(uri_parts).unwrap_or(parts.uri.clone());

    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let req = Request::from_parts(parts, body);

    match state.client.request(req).await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(method = %method, path = %path, status = %status, "Forwarded request");
            metrics::record_forwarded(status.as_u16());

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(err) => {
            tracing::error!(method = %method, path = %path, error = %err, "Upstream request failed");
            metrics::record_forwarded(StatusCode::BAD_GATEWAY.as_u16());
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Wait for Ctrl-C or a coordinator-triggered shutdown.
async fn shutdown_signal(mut shutdown_rx: broadcast::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = shutdown_rx.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
