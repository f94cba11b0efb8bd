//! Release record data structure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Display format used for every stored and rendered date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An upcoming set release tracked in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Set code (e.g., "MKM"), always uppercase
    pub code: String,

    /// Set display name
    pub name: String,

    /// Date previews begin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_date: Option<NaiveDate>,

    /// Tabletop release date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,

    /// Announcement page the record came from
    pub source_link: String,
}

impl ReleaseRecord {
    /// Whether the automatic purge should remove this record for `cutoff`.
    ///
    /// Records without a release date never expire.
    pub fn is_expired(&self, cutoff: NaiveDate) -> bool {
        self.release_date.is_some_and(|date| date <= cutoff)
    }

    /// Preview date as `YYYY-MM-DD`, or "TBA" when unknown.
    pub fn preview_display(&self) -> String {
        display_date(self.preview_date)
    }

    /// Release date as `YYYY-MM-DD`, or "TBA" when unknown.
    pub fn release_display(&self) -> String {
        display_date(self.release_date)
    }
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "TBA".to_string())
}

/// Normalize a user-supplied set code: trimmed and uppercased.
pub fn normalize_code(raw: &str) -> Result<String> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(AppError::validation("Set code must not be empty."));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::validation(format!(
            "Invalid set code '{code}'. Use letters and digits only."
        )));
    }
    Ok(code.to_ascii_uppercase())
}
