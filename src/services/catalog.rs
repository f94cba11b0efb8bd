// src/services/catalog.rs

//! Release catalog service.
//!
//! Validates user input, drives the scrape flow and talks to the repository.
//! Every failure is returned to the caller; nothing is retried.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::error::{AppError, Result};
use crate::models::{ReleaseRecord, ScraperConfig, normalize_code};
use crate::services::Extractor;
use crate::storage::ReleaseRepository;
use crate::utils::http::PageFetcher;
use crate::utils::{is_official_source, parse_date};

/// Raw arguments of a manual `addset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub code: String,
    pub name: String,
    pub preview_date: String,
    pub release_date: String,
    pub source_link: String,
}

/// Service for adding, finding and removing tracked releases.
pub struct ReleaseCatalog {
    repository: Arc<dyn ReleaseRepository>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Extractor,
    scraper: ScraperConfig,
    retention: chrono::Duration,
}

impl ReleaseCatalog {
    pub fn new(
        repository: Arc<dyn ReleaseRepository>,
        fetcher: Arc<dyn PageFetcher>,
        scraper: ScraperConfig,
        retention: chrono::Duration,
    ) -> Result<Self> {
        Ok(Self {
            repository,
            fetcher,
            extractor: Extractor::new()?,
            scraper,
            retention,
        })
    }

    /// Add a release from user-entered fields.
    pub async fn add_manual(&self, input: NewRelease) -> Result<ReleaseRecord> {
        let (Some(preview_date), Some(release_date)) = (
            parse_date(&input.preview_date),
            parse_date(&input.release_date),
        ) else {
            return Err(AppError::validation(
                "Invalid date format. Please use YYYY-MM-DD.",
            ));
        };

        self.check_source(&input.source_link)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Set name must not be empty."));
        }

        let record = ReleaseRecord {
            code: normalize_code(&input.code)?,
            name: name.to_string(),
            preview_date: Some(preview_date),
            release_date: Some(release_date),
            source_link: input.source_link,
        };

        self.insert_new(record).await
    }

    /// Fetch an announcement page and add the release it describes.
    pub async fn scrape(&self, url: &str) -> Result<ReleaseRecord> {
        self.check_source(url)?;

        log::info!("Scraping release announcement {}", url);
        let page = self.fetcher.fetch(url).await?;

        let published = self
            .extractor
            .extract_publish_date(&page)
            .ok_or_else(|| AppError::extraction("no publish date found"))?;
        if published.year() < self.scraper.min_publish_year {
            return Err(AppError::StaleSource {
                published,
                min_year: self.scraper.min_publish_year,
            });
        }

        let analysis = self.extractor.analyze(&page)?;
        let code = analysis
            .code
            .ok_or_else(|| AppError::extraction("no set code found"))?;

        let record = ReleaseRecord {
            code: normalize_code(&code)?,
            name: analysis.name,
            preview_date: analysis.preview_date,
            release_date: analysis.release_date,
            source_link: url.to_string(),
        };

        self.insert_new(record).await
    }

    /// Look up a release by code.
    pub async fn find(&self, code: &str) -> Result<ReleaseRecord> {
        let code = normalize_code(code)?;
        self.repository
            .find_by_code(&code)
            .await?
            .ok_or_else(|| AppError::not_found(code))
    }

    /// All tracked releases.
    pub async fn list(&self) -> Result<Vec<ReleaseRecord>> {
        self.repository.list_all().await
    }

    /// Remove a release by code.
    pub async fn delete(&self, code: &str) -> Result<String> {
        let code = normalize_code(code)?;
        if !self.repository.delete_by_code(&code).await? {
            return Err(AppError::not_found(code));
        }
        log::info!("Deleted release {}", code);
        Ok(code)
    }

    /// Remove releases that came out more than the retention period before `today`.
    pub async fn purge_expired(&self, today: NaiveDate) -> Result<usize> {
        purge_expired(self.repository.as_ref(), today, self.retention).await
    }

    fn check_source(&self, url: &str) -> Result<()> {
        if is_official_source(url, &self.scraper.official_origin) {
            Ok(())
        } else {
            Err(AppError::validation(
                "Invalid blog link. Please provide an official WotC site.",
            ))
        }
    }

    async fn insert_new(&self, record: ReleaseRecord) -> Result<ReleaseRecord> {
        if self.repository.find_by_code(&record.code).await?.is_some() {
            return Err(AppError::duplicate(record.code));
        }
        self.repository.insert(&record).await?;
        log::info!("Added release {} ({})", record.code, record.name);
        Ok(record)
    }
}

/// Delete every record whose release date is at least `retention` before `today`.
pub async fn purge_expired(
    repository: &dyn ReleaseRepository,
    today: NaiveDate,
    retention: chrono::Duration,
) -> Result<usize> {
    let cutoff = today.checked_sub_signed(retention).ok_or_else(|| {
        AppError::config(format!(
            "retention of {} day(s) is out of range",
            retention.num_days()
        ))
    })?;
    let removed = repository.delete_expired(cutoff).await?;
    log::info!(
        "Purged {} release(s) dated on or before {}",
        removed,
        cutoff
    );
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::storage::MemoryRepository;

    const URL: &str = "https://magic.wizards.com/en/news/announcements/first-look-at-mkm";

    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::validation(format!("no stub page for {url}")))
        }
    }

    fn page(published: &str, code_block: &str) -> String {
        format!(
            r#"<html><head><title>First Look at Murders at Karlov Manor | Magic</title>
            <script type="application/ld+json">{{"datePublished":"{published}"}}</script></head>
            <body><p>Previews Begin: January 16</p><p>Tabletop Release: February 9</p>
            {code_block}</body></html>"#
        )
    }

    fn catalog_with(html: String) -> ReleaseCatalog {
        let fetcher = StubFetcher {
            pages: HashMap::from([(URL.to_string(), html)]),
        };
        ReleaseCatalog::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(fetcher),
            ScraperConfig::default(),
            chrono::Duration::days(7),
        )
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn manual(code: &str) -> NewRelease {
        NewRelease {
            code: code.to_string(),
            name: "Makkurosuke the Cat".to_string(),
            preview_date: "2024-03-14".to_string(),
            release_date: "2024-03-21".to_string(),
            source_link: "https://magic.wizards.com/en/news/mack".to_string(),
        }
    }

    #[tokio::test]
    async fn scrape_inserts_extracted_record() {
        let catalog = catalog_with(page(
            "2023-11-02",
            r##"Website: <a href="/en/products/mkm#daily-mkm">MKM</a>"##,
        ));

        let record = catalog.scrape(URL).await.unwrap();
        assert_eq!(record.code, "MKM");
        assert_eq!(record.name, "Murders at Karlov Manor");
        assert_eq!(record.preview_date, Some(date(2024, 1, 16)));
        assert_eq!(record.release_date, Some(date(2024, 2, 9)));
        assert_eq!(record.source_link, URL);

        assert_eq!(catalog.find("mkm").await.unwrap(), record);
    }

    #[tokio::test]
    async fn scrape_rejects_unofficial_source_before_fetching() {
        let catalog = catalog_with(String::new());
        let err = catalog.scrape("http://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn scrape_rejects_stale_pages() {
        let catalog = catalog_with(page("2022-09-01", "Website: #daily-dmu"));
        let err = catalog.scrape(URL).await.unwrap_err();
        assert!(matches!(err, AppError::StaleSource { min_year: 2023, .. }));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scrape_requires_publish_date() {
        let html = page("2023-11-02", "").replace("datePublished", "dateCreated");
        let catalog = catalog_with(html);
        let err = catalog.scrape(URL).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn scrape_without_code_persists_nothing() {
        let catalog = catalog_with(page("2023-11-02", ""));
        let err = catalog.scrape(URL).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(ref m) if m == "no set code found"));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scrape_reports_duplicates() {
        let catalog = catalog_with(page("2023-11-02", "Website: #daily-mkm"));
        catalog.scrape(URL).await.unwrap();
        let err = catalog.scrape(URL).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey { ref code } if code == "MKM"));
    }

    #[tokio::test]
    async fn add_manual_validates_dates() {
        let catalog = catalog_with(String::new());
        let mut input = manual("mack");
        input.release_date = "2024-3-21".to_string();

        let err = catalog.add_manual(input).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid date format. Please use YYYY-MM-DD.");
    }

    #[tokio::test]
    async fn add_manual_validates_link() {
        let catalog = catalog_with(String::new());
        let mut input = manual("mack");
        input.source_link = "https://en.wikipedia.org/wiki/Susuwatari".to_string();

        let err = catalog.add_manual(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn add_manual_then_duplicate() {
        let catalog = catalog_with(String::new());
        let added = catalog.add_manual(manual("mack")).await.unwrap();
        assert_eq!(added.code, "MACK");

        let mut again = manual("MACK");
        again.name = "Other".to_string();
        let err = catalog.add_manual(again).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey { .. }));
        assert_eq!(catalog.find("mack").await.unwrap().name, "Makkurosuke the Cat");
    }

    #[tokio::test]
    async fn find_and_delete_unknown_code() {
        let catalog = catalog_with(String::new());
        assert!(matches!(
            catalog.find("zzz").await,
            Err(AppError::NotFound { ref code }) if code == "ZZZ"
        ));
        assert!(matches!(
            catalog.delete("zzz").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn purge_uses_retention_window() {
        let catalog = catalog_with(String::new());
        catalog.add_manual(manual("mack")).await.unwrap();

        // Released 2024-03-21; cutoff = today - 7 days.
        assert_eq!(catalog.purge_expired(date(2024, 3, 27)).await.unwrap(), 0);
        assert_eq!(catalog.purge_expired(date(2024, 3, 28)).await.unwrap(), 1);
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purge_with_out_of_range_retention_fails() {
        let repo = MemoryRepository::new();
        let err = purge_expired(&repo, date(2024, 3, 28), chrono::Duration::days(4_000_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
