use std::path::PathBuf;

use axum::{routing::get, Json, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use request_gate::config::load_config;
use request_gate::{GateServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "request-gate", about = "HTTP request gate: rate limiting and security headers")]
struct Args {
    /// Path to a TOML config file. Defaults plus environment overrides are
    /// used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "request_gate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Misconfigured policy is fatal here, before any traffic is gated.
    let mut config = load_config(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listener.bind_address = listen;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_requests = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        production = config.security.production,
        limited_prefixes = ?config.classifier.limited_prefixes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => request_gate::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = GateServer::new(config, demo_app());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Minimal downstream app so the binary is runnable standalone. Real
/// deployments hand their own `Router` to [`GateServer::new`].
fn demo_app() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/api/status",
            get(|| async { Json(serde_json::json!({"status": "ok"})) }),
        )
}
