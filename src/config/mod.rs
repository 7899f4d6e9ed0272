use std::env;
use std::net::{SocketAddr, ToSocketAddrs};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Staging,
    Production,
}

impl AppEnvironment {
    /// Unknown values are rejected rather than silently downgraded to
    /// development; a typo in production deployment manifests should fail
    /// loudly at startup.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "test" | "ci" => Ok(Self::Test),
            "staging" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Top-level configuration for the service, read from `TRANSIT_*` variables
/// with `.env` support. Blank values count as unset.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = match env_value("TRANSIT_ENV") {
            Some(raw) => AppEnvironment::parse(&raw)?,
            None => AppEnvironment::Development,
        };

        let host = env_value("TRANSIT_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match env_value("TRANSIT_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw.clone() })?,
            None => DEFAULT_PORT,
        };

        let log_level =
            env_value("TRANSIT_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Resolve the bind address through the system resolver, so hostnames
    /// like `localhost` work the same way as literal addresses.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let mut candidates = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| ConfigError::HostResolution {
                host: self.host.clone(),
                source,
            })?;

        candidates
            .next()
            .ok_or_else(|| ConfigError::NoAddressForHost(self.host.clone()))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TRANSIT_ENV '{0}' is not one of development, test, staging, production")]
    UnknownEnvironment(String),
    #[error("TRANSIT_PORT '{value}' is not a valid port number")]
    InvalidPort { value: String },
    #[error("TRANSIT_HOST '{host}' did not resolve")]
    HostResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TRANSIT_HOST '{0}' resolved to no addresses")]
    NoAddressForHost(String),
}
