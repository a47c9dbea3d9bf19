//! Application configuration with layered loading.
//!
//! Configuration is assembled with figment from, in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. TOML config file (if ROSTER_CONFIG_FILE set)
//! 3. Environment variables (ROSTER_*)

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite member database.
    ///
    /// Set via ROSTER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for profile page requests.
    ///
    /// Set via ROSTER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via ROSTER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Scheme and host prefixed to short codes.
    ///
    /// Set via ROSTER_SHORT_URL_HOST environment variable.
    #[serde(default = "default_short_url_host")]
    pub short_url_host: String,

    /// Minimum length of generated short codes.
    #[serde(default = "default_short_code_min_length")]
    pub short_code_min_length: u8,

    /// Upper bound on scrape jobs running at the same time.
    ///
    /// Set via ROSTER_MAX_CONCURRENT_JOBS environment variable.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./roster.sqlite")
}

fn default_user_agent() -> String {
    "roster/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_short_url_host() -> String {
    "http://localhost:3000".into()
}

fn default_short_code_min_length() -> u8 {
    6
}

fn default_max_concurrent_jobs() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            short_url_host: default_short_url_host(),
            short_code_min_length: default_short_code_min_length(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("ROSTER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ROSTER_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
