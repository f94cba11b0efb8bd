// src/error.rs

//! Unified error handling for the release tracker.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for release tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed date, disallowed URL or bad command arguments
    #[error("{0}")]
    Validation(String),

    /// A required field could not be found on the page
    #[error("Could not read the announcement page: {0}")]
    Extraction(String),

    /// Insert attempted for a code that is already stored
    #[error("{code} is already in the database. Look it up with `findset {code}` instead.")]
    DuplicateKey { code: String },

    /// Lookup or delete by an unknown code
    #[error("{code} not found.")]
    NotFound { code: String },

    /// The page predates the supported announcement layout
    #[error("Announcement published {published} predates {min_year}; older pages are not supported.")]
    StaleSource { published: NaiveDate, min_year: i32 },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regex compilation failed
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store is closed or otherwise unusable
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create a duplicate key error.
    pub fn duplicate(code: impl Into<String>) -> Self {
        Self::DuplicateKey { code: code.into() }
    }

    /// Create a not-found error.
    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
