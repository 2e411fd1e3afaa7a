//! HTTP server assembly for the gate.
//!
//! # Responsibilities
//! - Wrap a caller-supplied downstream router with the gate middleware
//! - Wire up ambient layers (tracing, request timeout)
//! - Serve with graceful shutdown and run the limiter sweeper

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::http::middleware::{gate_middleware, GateState};
use crate::security::rate_limit::run_sweeper;

/// HTTP server that gates every request to the downstream app.
pub struct GateServer {
    router: Router,
    config: GateConfig,
    state: Arc<GateState>,
}

impl GateServer {
    /// Wrap `app` (the downstream handlers, an external collaborator) with
    /// the gate. The request flows trace → timeout → gate → app; the gate
    /// decorates whatever response comes back up.
    pub fn new(config: GateConfig, app: Router) -> Self {
        let state = Arc::new(GateState::new(&config));

        let router = app
            .layer(middleware::from_fn_with_state(state.clone(), gate_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        Self {
            router,
            config,
            state,
        }
    }

    /// Run the server, accepting connections on the given listener, until
    /// ctrl-c or the shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gate server starting");

        tokio::spawn(run_sweeper(
            self.state.limiter(),
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
            Duration::from_secs(self.config.rate_limit.sweep_grace_secs),
            shutdown.resubscribe(),
        ));

        // ConnectInfo feeds the client key extractor's most-trusted source.
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("Gate server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

/// Wait for ctrl-c or the coordinated shutdown signal.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Shutdown signal received");
        }
        _ = shutdown.recv() => {
            tracing::info!("Shutdown triggered");
        }
    }
}
