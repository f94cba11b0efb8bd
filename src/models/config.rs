//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat command settings
    #[serde(default)]
    pub bot: BotConfig,

    /// Release database location
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Announcement page fetching and parsing
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Expired release cleanup
    #[serde(default)]
    pub purge: PurgeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.bot.prefix.trim().is_empty() {
            return Err(AppError::config("bot.prefix is empty"));
        }
        if self.bot.prefix.chars().any(char::is_whitespace) {
            return Err(AppError::config("bot.prefix must not contain whitespace"));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::config("database.path is empty"));
        }
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::config("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::config("scraper.timeout_secs must be > 0"));
        }
        let origin = url::Url::parse(&self.scraper.official_origin)?;
        if origin.scheme() != "https" {
            return Err(AppError::config(
                "scraper.official_origin must be an https URL",
            ));
        }
        if !(1..=MAX_INTERVAL_HOURS).contains(&self.purge.interval_hours) {
            return Err(AppError::config(format!(
                "purge.interval_hours must be between 1 and {MAX_INTERVAL_HOURS}"
            )));
        }
        if self.purge.retention_days > MAX_RETENTION_DAYS {
            return Err(AppError::config(format!(
                "purge.retention_days must be at most {MAX_RETENTION_DAYS}"
            )));
        }
        Ok(())
    }
}

/// Longest accepted gap between purge runs (one year).
const MAX_INTERVAL_HOURS: u64 = 366 * 24;

/// Longest accepted retention window (a century).
const MAX_RETENTION_DAYS: u32 = 36_500;

/// Chat command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Prefix that marks a message as a command
    #[serde(default = "defaults::prefix")]
    pub prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: defaults::prefix(),
        }
    }
}

/// Release database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "defaults::database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: defaults::database_path(),
        }
    }
}

/// Announcement page fetching and parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Only links on this origin are accepted as sources
    #[serde(default = "defaults::official_origin")]
    pub official_origin: String,

    /// Pages published before this year use an unsupported layout
    #[serde(default = "defaults::min_publish_year")]
    pub min_publish_year: i32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            official_origin: defaults::official_origin(),
            min_publish_year: defaults::min_publish_year(),
        }
    }
}

/// Expired release cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Hours between purge runs
    #[serde(default = "defaults::interval_hours")]
    pub interval_hours: u64,

    /// Days a release is kept after its release date
    #[serde(default = "defaults::retention_days")]
    pub retention_days: u32,
}

impl PurgeConfig {
    pub fn interval(&self) -> Result<Duration> {
        self.interval_hours
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(|| AppError::config("purge.interval_hours is out of range"))
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            interval_hours: defaults::interval_hours(),
            retention_days: defaults::retention_days(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn prefix() -> String {
        ";".into()
    }
    pub fn database_path() -> PathBuf {
        PathBuf::from("data/mtg_sets.db")
    }
    pub fn user_agent() -> String {
        concat!("release-tracker/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn official_origin() -> String {
        "https://magic.wizards.com".into()
    }
    pub fn min_publish_year() -> i32 {
        2023
    }
    pub fn interval_hours() -> u64 {
        24
    }
    pub fn retention_days() -> u32 {
        7
    }
}
