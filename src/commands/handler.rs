// src/commands/handler.rs

//! Executes parsed commands against the release catalog.

use crate::commands::reply::{Embed, HELP_COLOR, Reply};
use crate::commands::{Command, addset_usage};
use crate::error::{AppError, Result};
use crate::services::ReleaseCatalog;

/// Turns chat messages into replies.
pub struct CommandHandler {
    catalog: ReleaseCatalog,
    prefix: String,
}

impl CommandHandler {
    pub fn new(catalog: ReleaseCatalog, prefix: impl Into<String>) -> Self {
        Self {
            catalog,
            prefix: prefix.into(),
        }
    }

    pub fn catalog(&self) -> &ReleaseCatalog {
        &self.catalog
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handle one chat message. Returns `None` when it is not a command.
    pub async fn handle_message(&self, message: &str) -> Option<Reply> {
        match Command::parse(message, &self.prefix) {
            Ok(None) => None,
            Ok(Some(command)) => Some(self.execute(command).await),
            Err(e) => Some(Reply::text(e.to_string())),
        }
    }

    /// Execute a command; failures become plain-text replies.
    pub async fn execute(&self, command: Command) -> Reply {
        let lookup = matches!(command, Command::FindSet { .. });
        match self.try_execute(command).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Command failed: {}", e);
                Reply::text(self.error_text(&e, lookup))
            }
        }
    }

    /// Execute a command, handing failures back to the caller.
    pub async fn try_execute(&self, command: Command) -> Result<Reply> {
        log::debug!("Executing {:?}", command);
        let reply = match command {
            Command::Help => Reply::text(self.help_text()),
            Command::AddSetHelp => self.addset_help(),
            Command::AddSet(input) => {
                let record = self.catalog.add_manual(input).await?;
                Reply::text(format!(
                    "{} **{}** has been added to the database.",
                    record.code, record.name
                ))
            }
            Command::ScrapeSet { url } => {
                let record = self.catalog.scrape(&url).await?;
                Reply::text(format!(
                    "{} **{}** has been added to the database.",
                    record.code, record.name
                ))
                .with_embed(Embed::release(&record))
            }
            Command::FindSet { code } => {
                Reply::embed(Embed::release(&self.catalog.find(&code).await?))
            }
            Command::ListSets => {
                let records = self.catalog.list().await?;
                if records.is_empty() {
                    Reply::text("No MTG sets found in the database.")
                } else {
                    Reply::embed(Embed::release_list(&records))
                }
            }
            Command::DeleteSet { code } => {
                let code = self.catalog.delete(&code).await?;
                Reply::text(format!("{code} has been deleted from the database."))
            }
        };
        Ok(reply)
    }

    /// Reply text for a failed command. A failed lookup points at `addset`.
    pub fn error_text(&self, error: &AppError, lookup: bool) -> String {
        match error {
            AppError::NotFound { code } if lookup => {
                format!("{code} not found. Add it through at `{}addset`?", self.prefix)
            }
            other => other.to_string(),
        }
    }

    fn addset_help(&self) -> Reply {
        let example = format!(
            "```{}addset mack \"Makkurosuke the Cat\" 2014-03-14 2018-03-21 https://magic.wizards.com/en/news/announcements/mack```",
            self.prefix
        );
        Reply::text(addset_usage(&self.prefix)).with_embed(
            Embed::new("Add Set Command Help", HELP_COLOR).field("Example", example, false),
        )
    }

    fn help_text(&self) -> String {
        let p = &self.prefix;
        [
            format!("`{p}addset <code> \"<name>\" <preview> <release> <link>` add a set by hand"),
            format!("`{p}addset help` show an example"),
            format!("`{p}scrapeset <link>` add a set from its First Look article"),
            format!("`{p}findset <code>` show one set"),
            format!("`{p}listsets` show every tracked set"),
            format!("`{p}delset <code>` remove a set"),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::models::ScraperConfig;
    use crate::storage::MemoryRepository;
    use crate::utils::http::PageFetcher;

    struct NoFetch;

    #[async_trait]
    impl PageFetcher for NoFetch {
        async fn fetch(&self, url: &str) -> Result<String> {
            Err(AppError::validation(format!("unexpected fetch of {url}")))
        }
    }

    fn handler() -> CommandHandler {
        let catalog = ReleaseCatalog::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(NoFetch),
            ScraperConfig::default(),
            chrono::Duration::days(7),
        )
        .unwrap();
        CommandHandler::new(catalog, ";")
    }

    const ADD: &str = r#";addset mkm "Murders at Karlov Manor" 2024-01-16 2024-02-09 https://magic.wizards.com/en/news/mkm"#;

    async fn text(handler: &CommandHandler, message: &str) -> String {
        handler
            .handle_message(message)
            .await
            .and_then(|r| r.content)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn add_find_delete_flow() {
        let handler = handler();

        assert_eq!(
            text(&handler, ADD).await,
            "MKM **Murders at Karlov Manor** has been added to the database."
        );

        let found = handler.handle_message(";findset mkm").await.unwrap();
        let embed = found.embed.unwrap();
        assert_eq!(embed.title, "Murders at Karlov Manor (MKM)");
        assert_eq!(embed.fields[1].value, "2024-02-09");

        assert_eq!(
            text(&handler, ";delset MKM").await,
            "MKM has been deleted from the database."
        );
        assert_eq!(text(&handler, ";delset MKM").await, "MKM not found.");
    }

    #[tokio::test]
    async fn duplicate_add_suggests_lookup() {
        let handler = handler();
        text(&handler, ADD).await;
        assert!(text(&handler, ADD).await.contains("findset MKM"));
    }

    #[tokio::test]
    async fn findset_unknown_suggests_addset() {
        assert_eq!(
            text(&handler(), ";findset xyz").await,
            "XYZ not found. Add it through at `;addset`?"
        );
    }

    #[tokio::test]
    async fn listsets_empty_and_populated() {
        let handler = handler();
        assert_eq!(
            text(&handler, ";listsets").await,
            "No MTG sets found in the database."
        );

        text(&handler, ADD).await;
        let reply = handler.handle_message(";listsets").await.unwrap();
        assert_eq!(reply.embed.unwrap().fields.len(), 1);
    }

    #[tokio::test]
    async fn addset_help_has_example_embed() {
        let reply = handler().handle_message(";addset help").await.unwrap();
        assert!(reply.content.unwrap().starts_with("`;addset setcode"));
        assert_eq!(reply.embed.unwrap().color, HELP_COLOR);
    }

    #[tokio::test]
    async fn scrape_rejects_unofficial_link() {
        assert_eq!(
            text(&handler(), ";scrapeset http://example.com").await,
            "Invalid blog link. Please provide an official WotC site."
        );
    }

    #[tokio::test]
    async fn unquoted_name_lands_in_date_fields() {
        let reply = text(
            &handler(),
            ";addset mkm Murders at Karlov https://magic.wizards.com/en/news/mkm",
        )
        .await;
        assert_eq!(reply, "Invalid date format. Please use YYYY-MM-DD.");
    }

    #[tokio::test]
    async fn try_execute_returns_the_error() {
        let err = handler()
            .try_execute(Command::FindSet {
                code: "xyz".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { ref code } if code == "XYZ"));
    }

    #[tokio::test]
    async fn non_commands_are_ignored() {
        assert!(handler().handle_message("good morning").await.is_none());
    }
}
