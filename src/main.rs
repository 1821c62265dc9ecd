//! Resource router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────▶ http::server (axum, timeout, trace)
//!                    │  alias rewrite
//!                    ▼
//!                 routing::Router ──▶ pattern (resource, headers)
//!                    │            ──▶ negotiation (Accept*)
//!                    ▼
//!                 handler response | 405 / 415 / 406 / 426 / 404
//!                    │  association headers
//!     ◀──────────────┘
//!
//!     Cross-cutting: config, observability, lifecycle (shutdown, signals)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use resource_router::config::{load_config, ServerConfig};
use resource_router::lifecycle::{shutdown_signal, Shutdown};
use resource_router::observability::{logging, metrics};
use resource_router::HttpServer;

#[derive(Parser)]
#[command(name = "resource-router")]
#[command(about = "Serve a configured route table", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("resource-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        aliases = config.aliases.len(),
        request_timeout_secs = config.listener.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let server = HttpServer::from_config(config, shutdown)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
