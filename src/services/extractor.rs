// src/services/extractor.rs

//! Announcement page extractor.
//!
//! Turns the raw HTML of a "First Look at ..." announcement into an
//! [`Analysis`]. All patterns target the publisher's post-2023 article
//! template; the extractor performs no I/O.
//!
//! Preview and release dates appear on the page as `<Month> <Day>` without a
//! year. The year is inferred from the page's publish date: an announcement
//! published in Q4 that mentions a Q1 month refers to the following year.

use chrono::{Datelike, Month, NaiveDate};
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::utils::parse_date;

/// Fields pulled from an announcement page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub name: String,
    pub code: Option<String>,
    pub preview_date: Option<NaiveDate>,
    pub release_date: Option<NaiveDate>,
    pub publish_date: NaiveDate,
}

/// Compiled patterns for one announcement page layout.
pub struct Extractor {
    title_selector: Selector,
    og_title_selector: Selector,
    first_look: Regex,
    website_code: Regex,
    keyword_code: Regex,
    date_published: Regex,
    previews_begin: Regex,
    tabletop_launch: Regex,
    tabletop_release: Regex,
}

impl Extractor {
    /// Compile every selector and pattern.
    pub fn new() -> Result<Self> {
        Ok(Self {
            title_selector: parse_selector("title")?,
            og_title_selector: parse_selector(r#"meta[property="og:title"]"#)?,
            first_look: Regex::new(r"First Look at\s+(.+?)(?:\s*\|.*|\s+[-–—]\s+.*)?\s*$")?,
            website_code: Regex::new(r"(?s)Website:.*?daily-([A-Za-z0-9]+)")?,
            keyword_code: Regex::new(
                r#"(?i)["']?keywords["']?\s*(?:content\s*=|:)\s*["']\s*([A-Za-z0-9]+)\s*(?:,|["'])"#,
            )?,
            date_published: Regex::new(r#""datePublished"\s*:\s*"(\d{4}-\d{2}-\d{2})"#)?,
            previews_begin: label_pattern("Previews Begin:")?,
            tabletop_launch: label_pattern("Tabletop Launch:")?,
            tabletop_release: label_pattern("Tabletop Release:")?,
        })
    }

    /// Extract the set name from the page title ("First Look at <name>").
    pub fn extract_name(&self, text: &str) -> Option<String> {
        let document = Html::parse_document(text);

        let title = document
            .select(&self.title_selector)
            .map(|el| el.text().collect::<String>())
            .chain(
                document
                    .select(&self.og_title_selector)
                    .filter_map(|el| el.value().attr("content").map(str::to_string)),
            )
            .map(|t| normalize_whitespace(&t))
            .find(|t| self.first_look.is_match(t))?;

        let caps = self.first_look.captures(&title)?;
        let name = caps.get(1)?.as_str().trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Extract the set code, preferring the "Website:" anchor over the
    /// keyword list.
    pub fn extract_code(&self, text: &str) -> Option<String> {
        [&self.website_code, &self.keyword_code]
            .into_iter()
            .find_map(|pattern| pattern.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_ascii_uppercase())
    }

    /// Extract the page's own publish date.
    pub fn extract_publish_date(&self, text: &str) -> Option<NaiveDate> {
        let caps = self.date_published.captures(text)?;
        parse_date(caps.get(1)?.as_str())
    }

    /// Date following the "Previews Begin:" label.
    pub fn extract_preview_date(
        &self,
        text: &str,
        publish_date: Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        interpret_date(text, &self.previews_begin, publish_date)
    }

    /// Date following "Tabletop Launch:", or "Tabletop Release:" as fallback.
    pub fn extract_release_date(
        &self,
        text: &str,
        publish_date: Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        interpret_date(text, &self.tabletop_launch, publish_date)
            .or_else(|| interpret_date(text, &self.tabletop_release, publish_date))
    }

    /// Run every extraction over one page.
    ///
    /// A missing name or publish date fails the whole page; code and dates
    /// are optional.
    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        let name = self
            .extract_name(text)
            .ok_or_else(|| AppError::extraction("no set name found"))?;
        let publish_date = self
            .extract_publish_date(text)
            .ok_or_else(|| AppError::extraction("no publish date found"))?;

        let analysis = Analysis {
            code: self.extract_code(text),
            preview_date: self.extract_preview_date(text, Some(publish_date)),
            release_date: self.extract_release_date(text, Some(publish_date)),
            name,
            publish_date,
        };

        log::debug!("Analyzed page: {:?}", analysis);
        Ok(analysis)
    }
}

/// Find a `<Month> <Day>` fragment with `pattern` and attach an inferred year.
///
/// `pattern` must capture the month name in group 1 and the day in group 2.
pub fn interpret_date(
    text: &str,
    pattern: &Regex,
    publish_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    let publish_date = publish_date?;
    let caps = pattern.captures(text)?;
    let month = caps.get(1)?.as_str().parse::<Month>().ok()?.number_from_month();
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;

    NaiveDate::from_ymd_opt(infer_year(month, publish_date), month, day)
}

/// Year for a Q1 `month` mentioned on a page published on `publish_date`.
pub fn infer_year(month: u32, publish_date: NaiveDate) -> i32 {
    if month <= 3 && publish_date.month() >= 10 {
        publish_date.year() + 1
    } else {
        publish_date.year()
    }
}

/// Pattern for `<label> <Month> <Day>`, tolerating inline markup after the label.
fn label_pattern(label: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"(?i){}(?:\s|&nbsp;|<[^>]*>)*([A-Za-z]+)\.?\s+(\d{{1,2}})\b",
        regex::escape(label)
    ))?)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
