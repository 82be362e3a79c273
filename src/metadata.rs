//! Page metadata parsed from a header section at the top of the page.
//!
//! Authors put metadata in the first few paragraphs of a page, one
//! `key: value` pair per paragraph, ended by a blank paragraph:
//!
//! ```text
//! Date: 2020-01-01T00:00:00Z
//! Tags: go, web
//! Status: hidden
//!
//! First paragraph of the body...
//! ```
//!
//! ## Header recognition
//!
//! The scan walks top-level blocks from the front and stops at the first
//! block that can't be a header line:
//!
//! - not a text block, or a text block with no inline runs
//! - the first inline run carries formatting (bold, link, ...). Body
//!   paragraphs that happen to start with `Word:` are usually formatted, and
//!   this keeps them out of the header.
//! - no `:` in the text
//!
//! A whitespace-only paragraph ends the header and is consumed with it.
//! Everything consumed is removed from the returned tree, so the renderer
//! never sees the header.
//!
//! ## Recognized keys
//!
//! Keys are matched case-insensitively against a closed set
//! ([`MetadataKey`]). An unknown key is an error rather than a silently
//! ignored line: a typo in `Stauts: hidden` would otherwise publish a page
//! the author meant to hide. Date-like keys must be RFC 3339
//! (`2002-06-21T04:15:29-07:00`); a bad date is an error too.
//!
//! ## Single pass
//!
//! Extraction only recognizes a header at the very top of the tree, so
//! running it on an already-stripped tree finds nothing and returns it as-is.
//! The loader still extracts exactly once per load.

use crate::id::PageId;
use crate::types::{Block, BlockKind, PageTree};
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("unsupported metadata key '{key}' in page '{id}'")]
    UnknownKey { id: PageId, key: String },
    #[error("failed to parse {key} '{value}' in page '{id}': {source}")]
    InvalidDate {
        id: PageId,
        key: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl MetadataError {
    pub fn page_id(&self) -> &PageId {
        match self {
            Self::UnknownKey { id, .. } | Self::InvalidDate { id, .. } => id,
        }
    }
}

/// A date-like metadata value: the text as written plus its parsed instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    pub raw: String,
    pub parsed: DateTime<FixedOffset>,
}

impl Timestamp {
    fn parse(id: &PageId, key: MetadataKey, raw: &str) -> Result<Self, MetadataError> {
        let parsed =
            DateTime::parse_from_rfc3339(raw).map_err(|source| MetadataError::InvalidDate {
                id: id.clone(),
                key: key.as_str(),
                value: raw.to_string(),
                source,
            })?;
        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }
}

/// Publication state derived from the free-form `status` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Rendered but meant to be kept out of published navigation.
    Hidden,
    /// Rendered but left out of the listing.
    NotImportant,
    /// No status, or a value with no special meaning.
    Normal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Overrides the page's own id where one is needed for linking.
    pub id: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<Timestamp>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub description: Option<String>,
    pub header_image: Option<String>,
    pub collection: Option<String>,
    /// Stored verbatim; see [`Metadata::status`] for the interpretation.
    pub status: Option<String>,
}

impl Metadata {
    pub fn status(&self) -> Status {
        match self.status.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("hidden") => Status::Hidden,
            Some(s) if s.eq_ignore_ascii_case("notimportant") => Status::NotImportant,
            _ => Status::Normal,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.status() == Status::Hidden
    }

    pub fn is_not_important(&self) -> bool {
        self.status() == Status::NotImportant
    }

    /// True when no header line was found.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&mut self, id: &PageId, key: MetadataKey, value: &str) -> Result<(), MetadataError> {
        match key {
            MetadataKey::Tags => {
                self.tags = value
                    .split(',')
                    .map(str::trim)
                    .map(String::from)
                    .collect();
            }
            MetadataKey::Id => self.id = Some(value.to_string()),
            MetadataKey::Date => self.date = Some(Timestamp::parse(id, key, value)?),
            MetadataKey::CreatedAt => self.created_at = Some(Timestamp::parse(id, key, value)?),
            MetadataKey::UpdatedAt => self.updated_at = Some(Timestamp::parse(id, key, value)?),
            MetadataKey::Status => self.status = Some(value.to_string()),
            MetadataKey::Description => self.description = Some(value.to_string()),
            MetadataKey::HeaderImage => self.header_image = Some(value.to_string()),
            MetadataKey::Collection => self.collection = Some(value.to_string()),
        }
        Ok(())
    }
}

/// The closed set of header keys. Anything else is a [`MetadataError::UnknownKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    Tags,
    Id,
    Date,
    CreatedAt,
    UpdatedAt,
    Status,
    Description,
    HeaderImage,
    Collection,
}

impl MetadataKey {
    /// Match an already lower-cased key.
    pub fn from_lowercase(key: &str) -> Option<Self> {
        Some(match key {
            "tags" => Self::Tags,
            "id" => Self::Id,
            "date" => Self::Date,
            "createdat" => Self::CreatedAt,
            "updatedat" => Self::UpdatedAt,
            "status" => Self::Status,
            "description" => Self::Description,
            "headerimage" => Self::HeaderImage,
            "collection" => Self::Collection,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Id => "id",
            Self::Date => "date",
            Self::CreatedAt => "createdat",
            Self::UpdatedAt => "updatedat",
            Self::Status => "status",
            Self::Description => "description",
            Self::HeaderImage => "headerimage",
            Self::Collection => "collection",
        }
    }
}

/// How one leading block participates in the header.
enum HeaderLine<'a> {
    Entry { key: &'a str, value: &'a str },
    /// Blank paragraph: ends the header, consumed.
    Blank,
    /// Belongs to the body: ends the header, not consumed.
    End,
}

fn classify(block: &Block) -> HeaderLine<'_> {
    if block.kind != BlockKind::Text {
        return HeaderLine::End;
    }
    let Some(run) = block.inline.first() else {
        return HeaderLine::End;
    };
    if !run.is_plain() {
        return HeaderLine::End;
    }
    let text = run.text.trim();
    if text.is_empty() {
        return HeaderLine::Blank;
    }
    match text.split_once(':') {
        Some((key, value)) => HeaderLine::Entry {
            key: key.trim(),
            value: value.trim(),
        },
        None => HeaderLine::End,
    }
}

/// Parse the header section off the front of `tree`.
///
/// Returns the metadata and the tree with the header blocks removed; the
/// remaining blocks are untouched and keep their order.
pub fn extract(mut tree: PageTree) -> Result<(Metadata, PageTree), MetadataError> {
    let id = tree.page_id();
    let mut meta = Metadata::default();
    let mut consumed = 0;

    for block in &tree.blocks {
        match classify(block) {
            HeaderLine::End => break,
            HeaderLine::Blank => {
                consumed += 1;
                break;
            }
            HeaderLine::Entry { key, value } => {
                let key = key.to_lowercase();
                let parsed = MetadataKey::from_lowercase(&key).ok_or_else(|| {
                    MetadataError::UnknownKey {
                        id: id.clone(),
                        key: key.clone(),
                    }
                })?;
                meta.apply(&id, parsed, value)?;
                consumed += 1;
            }
        }
    }

    tree.blocks.drain(..consumed);
    Ok((meta, tree))
}
