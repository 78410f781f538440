//! Server instance management

use axum::Router;
use http::HeaderValue;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers::{create_router, AppState};
use lerecit::ProjectSummarizer;
use lestockage::{Storage, StorageConfig};

/// Router with state, CORS and request tracing applied
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let trace = state.config.enable_logging;
    let app = create_router().with_state(state).layer(cors);
    if trace {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    layer.allow_origin(origins)
}

/// LeServe HTTP server
///
/// Manages Axum server lifecycle including startup and graceful shutdown.
pub struct LeServeServer {
    /// Server configuration
    config: ServerConfig,

    /// Storage layer wrapped in Arc<Mutex> for thread safety
    storage: Arc<Mutex<Storage>>,

    /// Shared summarizer
    summarizer: Arc<ProjectSummarizer>,
}

impl LeServeServer {
    /// Create new server instance, opening the database
    pub fn new(
        config: ServerConfig,
        storage_config: &StorageConfig,
        summarizer: ProjectSummarizer,
    ) -> Result<Self, ApiError> {
        let storage = Storage::from_config(storage_config).map_err(|e| {
            error!("Failed to open storage: {}", e);
            ApiError::internal(format!("Failed to open storage: {}", e))
        })?;
        Self::with_storage(config, storage, summarizer)
    }

    /// Create server instance around an open database
    pub fn with_storage(
        config: ServerConfig,
        storage: Storage,
        summarizer: ProjectSummarizer,
    ) -> Result<Self, ApiError> {
        if let Err(e) = config.validate() {
            return Err(ApiError::internal(format!("Invalid config: {}", e)));
        }

        Ok(Self {
            config,
            storage: Arc::new(Mutex::new(storage)),
            summarizer: Arc::new(summarizer),
        })
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, ApiError> {
        self.config
            .socket_addr()
            .map_err(|e| ApiError::internal(format!("Failed to parse address: {}", e)))
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn start(&self) -> Result<(), ApiError> {
        let addr = self.socket_addr()?;

        let state = AppState::new_from_arc(
            Arc::clone(&self.storage),
            self.config.clone(),
            Arc::clone(&self.summarizer),
        );
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| {
                error!("Failed to bind to {}: {:?}", addr, e);
                ApiError::internal(format!("Failed to bind to {}: {}", addr, e))
            })?;

        info!("Server listening on: {}", self.server_url());

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown())
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }

    /// Get storage reference
    #[must_use]
    pub fn storage(&self) -> Arc<Mutex<Storage>> {
        Arc::clone(&self.storage)
    }

    /// Get server URL
    #[must_use]
    pub fn server_url(&self) -> String {
        self.config.server_url()
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received TERM signal");
            }
            Err(e) => {
                error!("Failed to install TERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
