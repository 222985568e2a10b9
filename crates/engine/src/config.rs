//! Engine configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Tunables for the derivation stages.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Gap between ignition-on points that splits a trip in two.
    /// Strictly greater-than: a gap of exactly this many seconds extends.
    #[serde(default = "default_idle_gap_secs")]
    pub idle_gap_secs: i64,

    /// Closed trips shorter than this are dropped as GPS jitter.
    #[serde(default = "default_min_trip_distance_km")]
    pub min_trip_distance_km: f64,

    /// Repeat speed alerts for one (device, zone) pair are suppressed
    /// within this window.
    #[serde(default = "default_speed_alert_suppression_secs")]
    pub speed_alert_suppression_secs: i64,

    /// Attempts for committing a geofence status row before giving up on
    /// a state conflict.
    #[serde(default = "default_status_commit_attempts")]
    pub status_commit_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            idle_gap_secs: default_idle_gap_secs(),
            min_trip_distance_km: default_min_trip_distance_km(),
            speed_alert_suppression_secs: default_speed_alert_suppression_secs(),
            status_commit_attempts: default_status_commit_attempts(),
        }
    }
}

// Default value functions
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_idle_gap_secs() -> i64 {
    180
}
fn default_min_trip_distance_km() -> f64 {
    0.05
}
fn default_speed_alert_suppression_secs() -> i64 {
    300
}
fn default_status_commit_attempts() -> u32 {
    3
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}
