use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::RecommenderSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub profile_service: ProfileServiceSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// L1-only when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileServiceSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_profile_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_profile_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_allow_expansion")]
    pub allow_expansion: bool,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_scoring_threads")]
    pub scoring_threads: usize,
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            allow_expansion: default_allow_expansion(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            scoring_threads: default_scoring_threads(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl RecommendationSettings {
    /// Requested page size, defaulted and capped
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }

    pub fn recommender(&self) -> RecommenderSettings {
        RecommenderSettings {
            default_radius_km: self.default_radius_km,
            allow_expansion: self.allow_expansion,
            scoring_threads: self.scoring_threads,
            deadline: Duration::from_millis(self.deadline_ms),
        }
    }
}

fn default_radius_km() -> f64 { 25.0 }
fn default_allow_expansion() -> bool { true }
fn default_page_size() -> u32 { 20 }
fn default_max_page_size() -> u32 { 100 }
fn default_scoring_threads() -> usize { 4 }
fn default_deadline_ms() -> u64 { 5_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    pub fn log_format(&self) -> LogFormat {
        LogFormat::parse(&self.format)
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Case-insensitive; anything unrecognized is compact
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with HUDDLE_)
    /// 5. `DATABASE_URL`, when set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., HUDDLE__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("HUDDLE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply well-known environment variables that live outside the HUDDLE prefix
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = std::env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recommendation_settings() {
        let settings = RecommendationSettings::default();
        assert_eq!(settings.default_radius_km, 25.0);
        assert!(settings.allow_expansion);
        assert_eq!(settings.default_page_size, 20);
        assert_eq!(settings.max_page_size, 100);
        assert_eq!(settings.recommender().deadline, Duration::from_secs(5));
    }

    #[test]
    fn test_page_size_is_capped() {
        let settings = RecommendationSettings::default();
        assert_eq!(settings.page_size(None), 20);
        assert_eq!(settings.page_size(Some(7)), 7);
        assert_eq!(settings.page_size(Some(5_000)), 100);
        assert_eq!(settings.page_size(Some(0)), 1);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
        assert_eq!(logging.log_format(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" pretty "), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Compact);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("huddle-algo-config-test.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 8081

            [database]
            url = "postgres://localhost/huddle"

            [profile_service]
            endpoint = "http://profiles.local"

            [recommendation]
            default_radius_km = 10.0
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.recommendation.default_radius_km, 10.0);
        assert_eq!(settings.recommendation.max_page_size, 100);
        assert!(settings.cache.redis_url.is_none());
        assert_eq!(settings.profile_service.timeout_secs, 10);
    }
}
