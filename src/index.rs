//! Listing assembly: which documents go on the archive page, and in what order.
//!
//! - Documents with status `notimportant` (any casing) are dropped.
//! - `hidden` documents stay. Hiding is about navigation, not the listing,
//!   and a hidden page is still published at its own URL.
//! - Entries are ordered newest first by the `date` header. Pages without a
//!   date sort after every dated page. Equal dates keep visit order.
//!
//! No markup is produced here; [`crate::render`] turns the entries into HTML.

use crate::id::PageId;
use crate::loader::Document;
use chrono::{DateTime, FixedOffset};
use std::cmp::Reverse;

/// One row of the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: PageId,
    pub title: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub tags: Vec<String>,
    /// Source text for the summary slot (the `description` header).
    pub summary: Option<String>,
    pub hidden: bool,
}

impl IndexEntry {
    fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title().to_string(),
            date: doc.meta.date.as_ref().map(|d| d.parsed),
            tags: doc.meta.tags.clone(),
            summary: doc.meta.description.clone(),
            hidden: doc.meta.is_hidden(),
        }
    }
}

pub fn assemble(documents: &[Document]) -> Vec<IndexEntry> {
    let mut entries: Vec<IndexEntry> = documents
        .iter()
        .filter(|d| !d.meta.is_not_important())
        .map(IndexEntry::from_document)
        .collect();
    // `None < Some(_)`, so reversing puts undated pages last.
    entries.sort_by_key(|e| Reverse(e.date));
    entries
}
