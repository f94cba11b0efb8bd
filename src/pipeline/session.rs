// src/pipeline/session.rs

//! Line-based chat session.
//!
//! Each input line is treated as one chat message; replies are written back
//! as rendered text. Lines that are not commands get no reply.

use std::io::BufRead;
use std::thread;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::commands::CommandHandler;
use crate::error::Result;

/// Serve commands until every sender of `lines` is gone.
///
/// Returns the number of messages that produced a reply.
pub async fn run_session<W>(
    handler: &CommandHandler,
    mut lines: mpsc::Receiver<String>,
    mut writer: W,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut handled = 0;

    while let Some(line) = lines.recv().await {
        let Some(reply) = handler.handle_message(&line).await else {
            continue;
        };
        writer.write_all(reply.to_string().as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    log::info!("Session ended after {} command(s)", handled);
    Ok(handled)
}

/// Read lines from `input` on a dedicated OS thread.
///
/// Blocking reads stay off the runtime, so shutting down never waits for the
/// next line. The channel closes at end of input or on a read error.
pub fn spawn_line_reader<R>(input: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        for line in input.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::Config;
    use crate::services::ReleaseCatalog;
    use crate::storage::MemoryRepository;
    use crate::utils::http::HttpFetcher;

    fn handler() -> CommandHandler {
        let config = Config::default();
        let catalog = ReleaseCatalog::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(HttpFetcher::from_config(&config.scraper).unwrap()),
            config.scraper.clone(),
            config.purge.retention(),
        )
        .unwrap();
        CommandHandler::new(catalog, config.bot.prefix)
    }

    #[tokio::test]
    async fn replies_only_to_commands() {
        let input = concat!(
            "hi everyone\n",
            ";addset dft \"Aetherdrift\" 2025-01-28 2025-02-14 https://magic.wizards.com/en/news/dft\n",
            ";listsets\n",
            "\n",
        );
        let mut output = Vec::new();

        let lines = spawn_line_reader(std::io::Cursor::new(input));
        let handled = run_session(&handler(), lines, &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(handled, 2);
        assert!(output.starts_with("DFT **Aetherdrift** has been added to the database.\n"));
        assert!(output.contains("┌ List of Upcoming Sets\n"));
        assert!(output.contains("│ Aetherdrift (DFT): Previews Begin: 2025-01-28\n"));
    }

    #[tokio::test]
    async fn empty_input_ends_immediately() {
        let mut output = Vec::new();
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        let handled = run_session(&handler(), rx, &mut output).await.unwrap();
        assert_eq!(handled, 0);
        assert!(output.is_empty());
    }
}
