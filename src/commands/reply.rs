// src/commands/reply.rs

//! Chat replies: a text line, an embed, or both.

use std::fmt;

use crate::models::ReleaseRecord;

/// Colour of release embeds.
pub const RELEASE_COLOR: u32 = 0x00ff00;

/// Colour of help embeds.
pub const HELP_COLOR: u32 = 0x7289da;

/// A message sent back to the chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<Embed>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embed: None,
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embed: Some(embed),
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(content) = &self.content {
            writeln!(f, "{content}")?;
        }
        if let Some(embed) = &self.embed {
            write!(f, "{embed}")?;
        }
        Ok(())
    }
}

/// Rich message block with a title and named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Detail card for a single release.
    pub fn release(record: &ReleaseRecord) -> Self {
        Self::new(format!("{} ({})", record.name, record.code), RELEASE_COLOR)
            .field("Previews Begin", record.preview_display(), false)
            .field("Release Date", record.release_display(), false)
            .field("Source Link", &record.source_link, false)
    }

    /// Overview of every tracked release, one field each.
    pub fn release_list(records: &[ReleaseRecord]) -> Self {
        records.iter().fold(
            Self::new("List of Upcoming Sets", RELEASE_COLOR),
            |embed, record| {
                embed.field(
                    format!("{} ({})", record.name, record.code),
                    format!(
                        "Previews Begin: {}\nRelease Date: {}\nSource Link: {}",
                        record.preview_display(),
                        record.release_display(),
                        record.source_link
                    ),
                    false,
                )
            },
        )
    }
}

impl fmt::Display for Embed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌ {}", self.title)?;
        for field in &self.fields {
            let mut lines = field.value.lines();
            writeln!(f, "│ {}: {}", field.name, lines.next().unwrap_or(""))?;
            for line in lines {
                writeln!(f, "│     {line}")?;
            }
        }
        writeln!(f, "└{}", "─".repeat(40))
    }
}
