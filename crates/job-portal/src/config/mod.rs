use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::priority::ForestConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dataset_path = env::var("APP_DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("job_descriptions.csv"));
        let model_path = env::var("APP_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("priority_model.json"));

        let defaults = ForestConfig::default();
        let n_trees = match env::var("APP_MODEL_TREES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|trees| *trees > 0)
                .ok_or(ConfigError::InvalidTreeCount(raw))?,
            Err(_) => defaults.n_trees,
        };
        let seed = match env::var("APP_MODEL_SEED") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed(raw))?,
            Err(_) => defaults.seed,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig { dataset_path },
            model: ModelConfig {
                path: model_path,
                forest: ForestConfig {
                    n_trees,
                    seed,
                    ..defaults
                },
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the candidate dataset.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub dataset_path: PathBuf,
}

/// Model artifact location and ensemble settings.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub forest: ForestConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTreeCount(String),
    InvalidSeed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTreeCount(raw) => {
                write!(f, "APP_MODEL_TREES must be a positive integer (got '{raw}')")
            }
            ConfigError::InvalidSeed(raw) => {
                write!(f, "APP_MODEL_SEED must be a valid u64 (got '{raw}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTreeCount(_)
            | ConfigError::InvalidSeed(_) => None,
        }
    }
}
