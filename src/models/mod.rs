// src/models/mod.rs

//! Domain models for the release tracker.

mod config;
mod release;

// Re-export all public types
pub use config::{BotConfig, Config, DatabaseConfig, PurgeConfig, ScraperConfig};
pub use release::{DATE_FORMAT, ReleaseRecord, normalize_code};
