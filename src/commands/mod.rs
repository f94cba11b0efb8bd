// src/commands/mod.rs

//! Chat command parsing and dispatch.
//!
//! Commands look like `;addset mkm "Murders at Karlov Manor" 2024-01-16
//! 2024-02-09 https://magic.wizards.com/...`. The prefix is configurable.

mod handler;
mod reply;

pub use handler::CommandHandler;
pub use reply::{Embed, EmbedField, HELP_COLOR, RELEASE_COLOR, Reply};

use crate::error::{AppError, Result};
use crate::services::NewRelease;
use crate::utils::args::parse_quoted_args;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Overview of every command
    Help,
    /// Usage and example for `addset`
    AddSetHelp,
    /// Manually add a release
    AddSet(NewRelease),
    /// Show one release
    FindSet { code: String },
    /// Show every release
    ListSets,
    /// Remove a release
    DeleteSet { code: String },
    /// Add a release from an announcement page
    ScrapeSet { url: String },
}

impl Command {
    /// Parse a chat message.
    ///
    /// Returns `Ok(None)` for messages that do not start with `prefix`.
    pub fn parse(message: &str, prefix: &str) -> Result<Option<Self>> {
        let Some(body) = message.trim().strip_prefix(prefix) else {
            return Ok(None);
        };
        let (name, rest) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        let args = parse_quoted_args(rest);

        let command = match name.to_lowercase().as_str() {
            "help" => Self::Help,
            "addset" if rest.trim_start().starts_with("help") => Self::AddSetHelp,
            "addset" => match <[String; 5]>::try_from(args) {
                Ok([code, name, preview_date, release_date, source_link]) => {
                    Self::AddSet(NewRelease {
                        code,
                        name,
                        preview_date,
                        release_date,
                        source_link,
                    })
                }
                Err(_) => return Err(usage(prefix, ADDSET_USAGE)),
            },
            "findset" => Self::FindSet {
                code: single_arg(args, prefix, "findset <code>")?,
            },
            "listsets" => Self::ListSets,
            "delset" => Self::DeleteSet {
                code: single_arg(args, prefix, "delset <code>")?,
            },
            "scrapeset" => Self::ScrapeSet {
                url: single_arg(args, prefix, "scrapeset <announcement url>")?,
            },
            other => {
                return Err(AppError::validation(format!(
                    "Unknown command `{prefix}{other}`. Try `{prefix}help`."
                )));
            }
        };

        Ok(Some(command))
    }
}

const ADDSET_USAGE: &str =
    r#"addset setcode "Title of the Set" (preview date) (release date) (WotC announcement page)"#;

fn usage(prefix: &str, text: &str) -> AppError {
    AppError::validation(format!("Usage: `{prefix}{text}`"))
}

fn single_arg(args: Vec<String>, prefix: &str, text: &str) -> Result<String> {
    match <[String; 1]>::try_from(args) {
        Ok([arg]) if !arg.is_empty() => Ok(arg),
        _ => Err(usage(prefix, text)),
    }
}

/// Usage line for `addset`, with the configured prefix.
pub fn addset_usage(prefix: &str) -> String {
    format!("`{prefix}{ADDSET_USAGE}`")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message: &str) -> Result<Option<Command>> {
        Command::parse(message, ";")
    }

    #[test]
    fn test_ignores_plain_messages() {
        assert_eq!(parse("hello there").unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_addset() {
        let command = parse(
            r#";addset mack "Makkurosuke the Cat" 2014-03-14 2018-03-21 https://magic.wizards.com/x"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            command,
            Command::AddSet(NewRelease {
                code: "mack".to_string(),
                name: "Makkurosuke the Cat".to_string(),
                preview_date: "2014-03-14".to_string(),
                release_date: "2018-03-21".to_string(),
                source_link: "https://magic.wizards.com/x".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_addset_help() {
        assert_eq!(parse(";addset help").unwrap(), Some(Command::AddSetHelp));
    }

    #[test]
    fn test_addset_wrong_arity_reports_usage() {
        let err = parse(r#";addset mkm "Murders at Karlov Manor""#).unwrap_err();
        assert!(err.to_string().starts_with("Usage: `;addset setcode"));

        let err = parse(";addset mkm Murders at Karlov Manor 2024-02-09").unwrap_err();
        assert!(err.to_string().starts_with("Usage: `;addset setcode"));
    }

    #[test]
    fn test_parse_single_argument_commands() {
        assert_eq!(
            parse(";findset mkm").unwrap(),
            Some(Command::FindSet { code: "mkm".to_string() })
        );
        assert_eq!(
            parse(";DELSET mkm").unwrap(),
            Some(Command::DeleteSet { code: "mkm".to_string() })
        );
        assert_eq!(
            parse(";scrapeset https://magic.wizards.com/en/news/x").unwrap(),
            Some(Command::ScrapeSet {
                url: "https://magic.wizards.com/en/news/x".to_string()
            })
        );
        assert!(parse(";findset").is_err());
        assert!(parse(";delset a b").is_err());
    }

    #[test]
    fn test_parse_listsets_and_help() {
        assert_eq!(parse(";listsets").unwrap(), Some(Command::ListSets));
        assert_eq!(parse("  ;help  ").unwrap(), Some(Command::Help));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse(";dance").unwrap_err();
        assert_eq!(err.to_string(), "Unknown command `;dance`. Try `;help`.");
    }

    #[test]
    fn test_custom_prefix() {
        assert_eq!(
            Command::parse("!listsets", "!").unwrap(),
            Some(Command::ListSets)
        );
        assert_eq!(Command::parse(";listsets", "!").unwrap(), None);
    }
}
