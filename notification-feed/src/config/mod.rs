use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid STORE_BACKEND: {}. Must be one of: mongodb, memory",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::MongoDb => write!(f, "mongodb"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb: MongoConfig,
    /// JSON seed loaded into the in-memory backend at startup.
    pub memory_seed_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Spans are exported over OTLP only when this is set.
    pub otlp_endpoint: Option<String>,
}

impl FeedConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        let backend: StoreBackend = get_env("STORE_BACKEND", Some("mongodb"), is_prod)?.parse()?;

        // The URI only matters when MongoDB is the backend
        let uri = match backend {
            StoreBackend::MongoDb => get_env("MONGODB_URI", None, is_prod)?,
            StoreBackend::Memory => env::var("MONGODB_URI").unwrap_or_default(),
        };

        Ok(FeedConfig {
            common: common_config,
            store: StoreConfig {
                backend,
                mongodb: MongoConfig {
                    uri,
                    database: get_env("MONGODB_DATABASE", Some("notification_db"), is_prod)?,
                },
                memory_seed_path: env::var("MEMORY_SEED_PATH").ok().filter(|s| !s.is_empty()),
            },
            telemetry: TelemetryConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            },
        })
    }
}
