//! Application startup and lifecycle management.
//!
//! Builds the document store from configuration, wires it into the router
//! and runs the HTTP server until a shutdown signal arrives.

use crate::config::{FeedConfig, StoreBackend, StoreConfig};
use crate::handlers::{get_notifications, health_check, metrics_endpoint, readiness_check};
use crate::services::{DocumentStore, InMemoryStore, MongoStore, NotificationFetcher};
use axum::{http::Request, middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub fetcher: NotificationFetcher,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            fetcher: NotificationFetcher::new(store.clone()),
            store,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/get-notifications", get(get_notifications))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| make_request_span(request)))
        .layer(from_fn(request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Build the store selected by configuration.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    match config.backend {
        StoreBackend::MongoDb => {
            let store = MongoStore::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;

            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;

            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let store = match &config.memory_seed_path {
                Some(path) => InMemoryStore::from_seed_file(path)?,
                None => {
                    tracing::warn!("No MEMORY_SEED_PATH set, in-memory document store starts empty");
                    InMemoryStore::new()
                }
            };
            tracing::warn!("Using in-memory document store, contents are not persisted");
            Ok(Arc::new(store))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the store named in the configuration.
    pub async fn build(config: FeedConfig) -> Result<Self, AppError> {
        let store = connect_store(&config.store).await?;
        Self::build_with_store(config, store).await
    }

    /// Build the application around an already constructed store.
    pub async fn build_with_store(
        config: FeedConfig,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, AppError> {
        tracing::info!(backend = store.backend_name(), "Document store ready");

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: build_router(AppState::new(store)),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Notification feed listening on port {}", self.port);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
