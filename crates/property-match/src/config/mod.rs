use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

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
    pub matching: MatchingConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matching: MatchingConfig::from_env()?,
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

/// Whether a pipeline pass re-sends notifications for pairs that were already notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPolicy {
    /// Every match returned by a run is dispatched, including rescored pairs.
    #[default]
    EveryRun,
    /// Rows already marked notified are skipped.
    UnnotifiedOnly,
}

/// Which rows the reconciliation retention sweep is allowed to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionScope {
    #[default]
    Global,
    Organization,
}

/// Largest accepted `MATCH_RECENT_WINDOW_HOURS` (one hundred years).
pub const MAX_RECENT_WINDOW_HOURS: i64 = 24 * 365 * 100;
/// Largest accepted `MATCH_RETENTION_DAYS` (one hundred years).
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Thresholds and windows used by the matching core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub auto_match_threshold: u8,
    pub recommendation_threshold: u8,
    pub recent_window_hours: i64,
    pub retention_days: i64,
    pub recommendation_page_size: usize,
    pub notification_policy: NotificationPolicy,
    pub retention_scope: RetentionScope,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            auto_match_threshold: 60,
            recommendation_threshold: 70,
            recent_window_hours: 24,
            retention_days: 30,
            recommendation_page_size: 1000,
            notification_policy: NotificationPolicy::EveryRun,
            retention_scope: RetentionScope::Global,
        }
    }
}

impl MatchingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let auto_match_threshold =
            threshold_var("MATCH_AUTO_THRESHOLD", defaults.auto_match_threshold)?;
        let recommendation_threshold =
            threshold_var("MATCH_RECOMMEND_THRESHOLD", defaults.recommendation_threshold)?;
        let recent_window_hours = bounded_var(
            "MATCH_RECENT_WINDOW_HOURS",
            defaults.recent_window_hours,
            MAX_RECENT_WINDOW_HOURS,
        )?;
        let retention_days =
            bounded_var("MATCH_RETENTION_DAYS", defaults.retention_days, MAX_RETENTION_DAYS)?;
        let recommendation_page_size = bounded_var(
            "MATCH_RECOMMEND_PAGE_SIZE",
            defaults.recommendation_page_size as i64,
            i64::from(u32::MAX),
        )? as usize;

        let notification_policy = match env::var("MATCH_NOTIFY_POLICY") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "every_run" | "always" => NotificationPolicy::EveryRun,
                "unnotified_only" | "once" => NotificationPolicy::UnnotifiedOnly,
                _ => return Err(ConfigError::invalid("MATCH_NOTIFY_POLICY", raw)),
            },
            Err(_) => defaults.notification_policy,
        };

        let retention_scope = match env::var("MATCH_RETENTION_SCOPE") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "global" => RetentionScope::Global,
                "organization" | "org" => RetentionScope::Organization,
                _ => return Err(ConfigError::invalid("MATCH_RETENTION_SCOPE", raw)),
            },
            Err(_) => defaults.retention_scope,
        };

        Ok(Self {
            auto_match_threshold,
            recommendation_threshold,
            recent_window_hours,
            retention_days,
            recommendation_page_size,
            notification_policy,
            retention_scope,
        })
    }
}

fn threshold_var(name: &'static str, default: u8) -> Result<u8, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u8>() {
            Ok(value) if value <= 100 => Ok(value),
            _ => Err(ConfigError::invalid(name, raw)),
        },
        Err(_) => Ok(default),
    }
}

fn bounded_var(name: &'static str, default: i64, max: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(value) if value > 0 && value <= max => Ok(value),
            _ => Err(ConfigError::invalid(name, raw)),
        },
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { name: &'static str, value: String },
}

impl ConfigError {
    fn invalid(name: &'static str, value: String) -> Self {
        Self::InvalidValue { name, value }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { name, value } => {
                write!(f, "{name} has an unsupported value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
