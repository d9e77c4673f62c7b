//! Anti-XSS Request-Filtering Gateway
//!
//! A filtering reverse proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │              XSS GUARD GATEWAY                │
//!                    │                                               │
//!   Client Request   │  ┌────────┐   ┌─────────────┐   ┌─────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│   filter    │──▶│ forward │──┼──▶ Upstream
//!                    │  │ server │   │ path/query/ │   │ handler │  │
//!                    │  └────────┘   │    body     │   └─────────┘  │
//!                    │               └──────┬──────┘                │
//!                    │                      │ match                 │
//!   400 + fixed body │                      ▼                       │
//!   ◀────────────────┼───────────── reject response                 │
//!                    │                                               │
//!                    │  ┌─────────────────────────────────────────┐ │
//!                    │  │          Cross-Cutting Concerns          │ │
//!                    │  │  config · observability · lifecycle      │ │
//!                    │  └─────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use xss_guard::config::loader::load_config;
use xss_guard::observability::{logging, metrics};
use xss_guard::{GuardConfig, GuardServer, Shutdown};

#[derive(Parser)]
#[command(name = "xss-guard")]
#[command(about = "Anti-XSS request-filtering gateway", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init();

    tracing::info!("xss-guard v0.1.0 starting");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let server = GuardServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
