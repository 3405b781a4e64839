//! API Server
//!
//! Binds the router with its middleware stack and serves until Ctrl+C or
//! SIGTERM.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::classifier::DrawingClassifier;
use crate::config::InklyConfig;
use crate::game::GameManager;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

pub struct ApiServer {
    config: InklyConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: InklyConfig, manager: Arc<GameManager>, classifier: Arc<dyn DrawingClassifier>) -> Self {
        let state = Arc::new(AppState {
            manager,
            classifier,
            classifier_timeout: config.classifier.timeout(),
        });
        Self { config, state }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.socket_addr()?;
        let app = self.create_app();

        info!("Starting Inkly API server");
        info!("   Listen: http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped gracefully");
        Ok(())
    }

    /// Router with the full middleware stack
    pub fn create_app(&self) -> axum::Router {
        build_app(self.state.clone(), &self.config)
    }

    fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self) {
        let server = &self.config.server;
        let game = &self.config.game;

        info!("   CORS: {:?}", server.allowed_origins);
        info!("   Request timeout: {}s", server.request_timeout_secs);
        info!("   Auto-provision players: {}", game.auto_provision_players);
        match game.rng_seed {
            Some(seed) => info!("   Prompt RNG seed: {}", seed),
            None => info!("   Prompt RNG seed: entropy"),
        }
        if self.config.classifier.api_key.is_none() {
            warn!("No classifier API key configured; every drawing gets the stub result");
        } else {
            info!("   Classifier model: {}", self.config.classifier.model);
        }
    }
}

/// Router plus request-id, CORS, timeout and trace layers
pub fn build_app(state: Arc<AppState>, config: &InklyConfig) -> axum::Router {
    create_router(state)
        // Request ID first so handlers can extract it
        .layer(axum::middleware::from_fn(request_id_middleware))
        // CORS before timeout to handle preflight
        .layer(create_cors_layer(config.server.allowed_origins.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
