//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout. Pages lead with their
//! visit position and title; ids, origin and header fields follow as
//! indented context lines.
//!
//! ## Build
//!
//! ```text
//! Pages
//! 001 Home (cache)
//!     Id: 0c896ea2efd24ec7be1d1f6e3b22d254
//!     Date: 2020-01-01T00:00:00Z
//!     Tags: go, web
//! 002 Draft notes (fetched, hidden)
//!     Id: 2131b10cebf64938a1277089ff02dbe4
//!
//! Failed
//!     7d2b...: page '7d2b...' not found
//!
//! Site
//! Home → index.html
//! Draft notes → 2131b10cebf64938a1277089ff02dbe4.html
//! Articles → archives.html (2 listed)
//! ```

use crate::cache::CacheStats;
use crate::generate::SiteSummary;
use crate::id::PageId;
use crate::loader::Document;
use crate::metadata::Status;
use crate::render::ARCHIVE_FILE;
use crate::store::Origin;
use crate::traverse::Traversal;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_title(title: &str) -> &str {
    if title.is_empty() { "Untitled" } else { title }
}

/// Header line for a page: position, title and how it was obtained.
fn page_header(pos: usize, doc: &Document) -> String {
    let origin = match doc.origin {
        Origin::Cache => "cache",
        Origin::Source => "fetched",
    };
    let status = match doc.meta.status() {
        Status::Hidden => ", hidden",
        Status::NotImportant => ", not important",
        Status::Normal => "",
    };
    format!(
        "{} {} ({}{})",
        format_index(pos),
        display_title(doc.title()),
        origin,
        status
    )
}

/// Indented context lines describing one document's metadata.
fn document_context(doc: &Document, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let meta = &doc.meta;
    let mut lines = vec![format!("{pad}Id: {}", doc.id)];
    if let Some(id) = &meta.id {
        lines.push(format!("{pad}Override id: {id}"));
    }
    for (label, ts) in [
        ("Date", &meta.date),
        ("Created", &meta.created_at),
        ("Updated", &meta.updated_at),
    ] {
        if let Some(ts) = ts {
            lines.push(format!("{pad}{label}: {}", ts.raw));
        }
    }
    if !meta.tags.is_empty() {
        lines.push(format!("{pad}Tags: {}", meta.tags.join(", ")));
    }
    if let Some(collection) = &meta.collection {
        lines.push(format!("{pad}Collection: {collection}"));
    }
    if let Some(desc) = &meta.description {
        lines.push(format!("{pad}Description: {}", truncate(desc, 60)));
    }
    if let Some(img) = &meta.header_image {
        lines.push(format!("{pad}Header image: {img}"));
    }
    if let Some(status) = &meta.status {
        lines.push(format!("{pad}Status: {status}"));
    }
    lines
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_traversal_output(traversal: &Traversal) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, doc) in traversal.documents.iter().enumerate() {
        lines.push(page_header(i + 1, doc));
        lines.extend(document_context(doc, 1));
    }
    if traversal.documents.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }

    if !traversal.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed".to_string());
        for failure in &traversal.failures {
            lines.push(format!("{}{}: {}", indent(1), failure.id, failure.error));
        }
    }
    lines
}

pub fn print_traversal_output(traversal: &Traversal) {
    for line in format_traversal_output(traversal) {
        println!("{}", line);
    }
}

pub fn format_site_output(summary: &SiteSummary) -> Vec<String> {
    let mut lines = vec!["Site".to_string()];
    for page in &summary.pages {
        let marker = if page.hidden { " (hidden)" } else { "" };
        lines.push(format!(
            "{} → {}{}",
            display_title(&page.title),
            page.file,
            marker
        ));
    }
    lines.push(format!("Articles → {} ({} listed)", ARCHIVE_FILE, summary.listed));
    lines
}

pub fn print_site_output(summary: &SiteSummary, stats: &CacheStats) {
    for line in format_site_output(summary) {
        println!("{}", line);
    }
    println!("Pages: {}", stats);
}

// ============================================================================
// Fetch / cached
// ============================================================================

pub fn format_document_output(doc: &Document) -> Vec<String> {
    let mut lines = vec![page_header(1, doc)];
    lines.extend(document_context(doc, 1));
    lines.push(format!("{}Blocks: {}", indent(1), doc.tree.blocks.len()));
    lines
}

pub fn print_document_output(doc: &Document) {
    for line in format_document_output(doc) {
        println!("{}", line);
    }
}

pub fn format_cached_output(ids: &[PageId]) -> Vec<String> {
    let mut lines = vec![format!("Cached pages ({})", ids.len())];
    lines.extend(
        ids.iter()
            .enumerate()
            .map(|(i, id)| format!("{} {}", format_index(i + 1), id)),
    );
    lines
}

pub fn print_cached_output(ids: &[PageId]) {
    for line in format_cached_output(ids) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::WrittenPage;
    use crate::loader::LoadError;
    use crate::metadata::{Metadata, Timestamp};
    use crate::source::FetchError;
    use crate::store::StoreError;
    use crate::test_helpers::*;
    use crate::traverse::Failure;
    use chrono::DateTime;

    fn doc(id: &str, title: &str, meta: Metadata, origin: Origin) -> Document {
        Document {
            id: PageId::normalize(id),
            tree: page_tree(id, title, vec![text_block("Body")]),
            meta,
            origin,
        }
    }

    #[test]
    fn format_index_zero_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn traversal_output_lists_pages_and_failures() {
        let meta = Metadata {
            date: Some(Timestamp {
                raw: "2020-01-01T00:00:00Z".into(),
                parsed: DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z").unwrap(),
            }),
            tags: vec!["go".into(), "web".into()],
            ..Metadata::default()
        };
        let hidden = Metadata {
            status: Some("hidden".into()),
            ..Metadata::default()
        };
        let traversal = Traversal {
            documents: vec![
                doc("AAAA", "Home", meta, Origin::Cache),
                doc("BBBB", "", hidden, Origin::Source),
            ],
            failures: vec![Failure {
                id: "CCCC".into(),
                error: LoadError::Store(StoreError::Fetch(FetchError::NotFound(
                    PageId::normalize("CCCC"),
                ))),
            }],
            ..Traversal::default()
        };

        let lines = format_traversal_output(&traversal);

        assert_eq!(
            lines,
            vec![
                "Pages",
                "001 Home (cache)",
                "    Id: AAAA",
                "    Date: 2020-01-01T00:00:00Z",
                "    Tags: go, web",
                "002 Untitled (fetched, hidden)",
                "    Id: BBBB",
                "    Status: hidden",
                "",
                "Failed",
                "    CCCC: page 'CCCC' not found",
            ]
        );
    }

    #[test]
    fn empty_traversal_says_none() {
        let lines = format_traversal_output(&Traversal::default());
        assert_eq!(lines, vec!["Pages", "    (none)"]);
    }

    #[test]
    fn site_output_maps_titles_to_files() {
        let summary = SiteSummary {
            pages: vec![
                WrittenPage {
                    id: PageId::normalize("AAAA"),
                    title: "Home".into(),
                    file: "index.html".into(),
                    hidden: false,
                },
                WrittenPage {
                    id: PageId::normalize("BBBB"),
                    title: "Secret".into(),
                    file: "BBBB.html".into(),
                    hidden: true,
                },
            ],
            listed: 2,
        };
        assert_eq!(
            format_site_output(&summary),
            vec![
                "Site",
                "Home → index.html",
                "Secret → BBBB.html (hidden)",
                "Articles → archives.html (2 listed)",
            ]
        );
    }

    #[test]
    fn document_output_shows_block_count() {
        let d = doc("AAAA", "Home", Metadata::default(), Origin::Source);
        let lines = format_document_output(&d);
        assert_eq!(lines[0], "001 Home (fetched)");
        assert_eq!(lines.last().unwrap(), "    Blocks: 1");
    }

    #[test]
    fn cached_output_numbers_ids() {
        let ids = vec![PageId::normalize("AAAA"), PageId::normalize("BBBB")];
        assert_eq!(
            format_cached_output(&ids),
            vec!["Cached pages (2)", "001 AAAA", "002 BBBB"]
        );
    }
}
