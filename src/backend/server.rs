//! Stub HTTP Server
//!
//! Axum server with CORS, request tracing and graceful shutdown.

use super::api::{api_router, ServerState};
use super::auth::{AuthState, ServerError};
use super::config::ServerConfig;
use crate::catalog::Catalog;
use axum::{
    http::{header, Method},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Development backend
pub struct StubServer {
    config: ServerConfig,
    state: Arc<ServerState>,
}

impl StubServer {
    /// Server with the demo accounts and a freshly seeded catalog
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let auth = AuthState::seeded(&config.jwt_secret, config.token_ttl_minutes)?;
        let state = ServerState::new(auth, Arc::new(Catalog::seeded()))
            .with_upload_limit(config.max_upload_bytes);
        Ok(Self::with_state(config, state))
    }

    pub fn with_state(config: ServerConfig, state: ServerState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Build the router with all routes and middleware
    pub fn router(&self) -> Router {
        let mut router = api_router(self.state.clone());

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_origin(
                    self.config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
            router = router.layer(cors);
        }

        if self.config.log_requests {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Bind the configured address and serve until a shutdown signal
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr).await?;

        if !self.config.is_localhost() {
            warn!("Stub server bound to {} - demo accounts are reachable", addr);
        }
        info!("Stub backend available at {}", self.config.base_url());

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` completes
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        info!("Starting stub server on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Stub server shut down gracefully");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
