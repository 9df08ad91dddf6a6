use notification_feed::config::{
    FeedConfig, MongoConfig, StoreBackend, StoreConfig, TelemetryConfig,
};
use notification_feed::services::DocumentStore;
use notification_feed::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

pub fn test_config(backend: StoreBackend, mongodb: MongoConfig) -> FeedConfig {
    // Use random port for testing (port 0)
    FeedConfig {
        common: CoreConfig { port: 0 },
        store: StoreConfig {
            backend,
            mongodb,
            memory_seed_path: None,
        },
        telemetry: TelemetryConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

impl TestApp {
    /// Spawn the server around an injected store.
    pub async fn spawn_with_store(store: Arc<dyn DocumentStore>) -> Self {
        let config = test_config(
            StoreBackend::Memory,
            MongoConfig {
                uri: String::new(),
                database: "unused".to_string(),
            },
        );

        let app = Application::build_with_store(config, store)
            .await
            .expect("Failed to build test application");

        Self::run(app).await
    }

    /// Spawn the server exactly as `main` would, from configuration.
    pub async fn spawn_from_config(config: FeedConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        Self::run(app).await
    }

    async fn run(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
