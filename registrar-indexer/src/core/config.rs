use std::path::PathBuf;
use thiserror::Error;

/// Indexer configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | database and log directory |
/// | DB_FILE | registrar.redb | database file under WORK_DIR |
/// | EVENT_FILE | (stdin) | JSON-lines event feed |
/// | RPC_URL | - | JSON-RPC endpoint for deed lookups |
/// | DEED_MAP_FILE | - | static label → deed map (JSON) |
/// | LOG_LEVEL | info | default log filter |
/// | LOG_JSON | false | JSON console logs |
/// | LOG_RETENTION_DAYS | 14 | rotated log retention |
/// | ENVIRONMENT | development | development / production |
///
/// # Example
///
/// ```ignore
/// DEED_MAP_FILE=deeds.json EVENT_FILE=events.jsonl cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the database and logs
    pub work_dir: String,
    /// Database file name, relative to `work_dir`
    pub db_file: String,
    /// Event feed; stdin when unset
    pub event_file: Option<String>,
    pub rpc_url: Option<String>,
    pub deed_map_file: Option<String>,
    pub log_level: String,
    pub log_json: bool,
    pub log_retention_days: u32,
    /// Runtime environment: development | production
    pub environment: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No deed source configured: set RPC_URL or DEED_MAP_FILE")]
    NoGateway,

    #[error("RPC_URL and DEED_MAP_FILE are mutually exclusive")]
    ConflictingGateways,
}

/// Where the winning-bid branch resolves deed addresses from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewaySource {
    Rpc(String),
    DeedMap(PathBuf),
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            db_file: std::env::var("DB_FILE").unwrap_or_else(|_| "registrar.redb".into()),
            event_file: non_empty_var("EVENT_FILE"),
            rpc_url: non_empty_var("RPC_URL"),
            deed_map_file: non_empty_var("DEED_MAP_FILE"),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_retention_days: std::env::var("LOG_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(14),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the work directory, keeping everything else
    ///
    /// Mostly used by tests
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.db_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Exactly one deed source must be configured
    pub fn gateway_source(&self) -> Result<GatewaySource, ConfigError> {
        match (&self.rpc_url, &self.deed_map_file) {
            (Some(url), None) => Ok(GatewaySource::Rpc(url.clone())),
            (None, Some(path)) => Ok(GatewaySource::DeedMap(PathBuf::from(path))),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingGateways),
            (None, None) => Err(ConfigError::NoGateway),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
