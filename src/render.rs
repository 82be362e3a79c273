//! HTML rendering of page trees and the archive listing.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating, so
//! every piece of page text is escaped on interpolation. Markdown is only
//! accepted in the `description` header, which becomes the summary line on
//! the archive page. Raw HTML inside a description is escaped like any
//! other page text.
//!
//! ## Block mapping
//!
//! | Block kind | HTML |
//! |------------|------|
//! | `text` | `<p>` |
//! | `header` / `sub_header` / `sub_sub_header` | `<h1>` / `<h2>` / `<h3>` |
//! | consecutive `bulleted_list` / `numbered_list` | one `<ul>` / `<ol>` |
//! | `quote` | `<blockquote>` |
//! | `code` | `<pre><code class="language-…">` |
//! | `image` | `<img>` |
//! | `divider` | `<hr>` |
//! | `page` | link to the sub-page |
//! | anything else | skipped |

use crate::id::PageId;
use crate::index::IndexEntry;
use crate::loader::Document;
use crate::types::{Block, BlockKind, InlineRun, TextAttr};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, Parser, html as md_html};

pub const CSS: &str = include_str!("../static/main.css");

/// File name of the archive listing in the output directory.
pub const ARCHIVE_FILE: &str = "archives.html";

/// Renders pages that link to each other.
///
/// The root page is written as `index.html`; every other page as `{id}.html`.
pub struct Renderer<'a> {
    site_title: &'a str,
    root: Option<&'a PageId>,
}

impl<'a> Renderer<'a> {
    pub fn new(site_title: &'a str, root: Option<&'a PageId>) -> Self {
        Self { site_title, root }
    }

    /// Output file name for a page.
    pub fn file_name(&self, id: &PageId) -> String {
        if self.root == Some(id) {
            "index.html".to_string()
        } else {
            format!("{id}.html")
        }
    }

    fn page_href(&self, raw_id: &str) -> String {
        format!("/{}", self.file_name(&PageId::normalize(raw_id)))
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    pub fn render_blocks(&self, blocks: &[Block]) -> Markup {
        let mut out = String::new();
        let mut i = 0;
        while i < blocks.len() {
            let kind = blocks[i].kind;
            if matches!(kind, BlockKind::BulletedList | BlockKind::NumberedList) {
                let run = blocks[i..].iter().take_while(|b| b.kind == kind).count();
                out.push_str(&self.render_list(kind, &blocks[i..i + run]).into_string());
                i += run;
            } else {
                out.push_str(&self.render_block(&blocks[i]).into_string());
                i += 1;
            }
        }
        PreEscaped(out)
    }

    fn render_list(&self, kind: BlockKind, items: &[Block]) -> Markup {
        let items = html! {
            @for item in items {
                li {
                    (render_inline(&item.inline))
                    (self.render_blocks(&item.children))
                }
            }
        };
        if kind == BlockKind::NumberedList {
            html! { ol { (items) } }
        } else {
            html! { ul { (items) } }
        }
    }

    fn render_block(&self, block: &Block) -> Markup {
        let inline = render_inline(&block.inline);
        match block.kind {
            BlockKind::Text => html! {
                p { (inline) }
                (self.render_blocks(&block.children))
            },
            BlockKind::Header => html! { h1 { (inline) } },
            BlockKind::SubHeader => html! { h2 { (inline) } },
            BlockKind::SubSubHeader => html! { h3 { (inline) } },
            BlockKind::Quote => html! { blockquote { (inline) } },
            BlockKind::Code => {
                let class = block.language.as_deref().map(|l| format!("language-{l}"));
                html! { pre { code class=[class] { (block.plain_text()) } } }
            }
            BlockKind::Image => html! {
                @if let Some(src) = &block.source {
                    img src=(src) alt=(block.plain_text()) loading="lazy";
                }
            },
            BlockKind::Divider => html! { hr; },
            BlockKind::Page => {
                let label = if block.title.is_empty() {
                    "Untitled"
                } else {
                    block.title.as_str()
                };
                html! {
                    div.page-link { a href=(self.page_href(&block.id)) { (label) } }
                }
            }
            // Lists are grouped by render_blocks.
            BlockKind::BulletedList | BlockKind::NumberedList | BlockKind::Other => html! {},
        }
    }

    // ========================================================================
    // Documents
    // ========================================================================

    pub fn render_document(&self, doc: &Document) -> Markup {
        let breadcrumb = html! {
            a href="/" { "Home" }
            " / "
            (doc.title())
        };
        let current = if self.root == Some(&doc.id) { "" } else { "page" };
        let content = html! {
            (site_header(breadcrumb, current, self.root.is_some()))
            main.page {
                @if let Some(img) = &doc.meta.header_image {
                    img.header-image src=(img) alt="";
                }
                h1.title { (doc.title()) }
                article {
                    (self.render_blocks(&doc.tree.blocks))
                }
            }
        };
        base_document(doc.title(), content)
    }

    pub fn render_archive(&self, entries: &[IndexEntry]) -> Markup {
        let breadcrumb = html! {
            a href="/" { "Home" }
            " / Articles"
        };
        let content = html! {
            (site_header(breadcrumb, "archives", self.root.is_some()))
            main.archive {
                ul.article-list {
                    @for entry in entries {
                        li {
                            a href={ "/" (self.file_name(&entry.id)) } { (entry.title) }
                            (entry_meta(entry))
                            @if let Some(summary) = &entry.summary {
                                div.article-summary { (markdown(summary)) }
                            }
                        }
                    }
                }
            }
        };
        base_document(self.site_title, content)
    }
}

// ============================================================================
// Inline text
// ============================================================================

pub fn render_inline(runs: &[InlineRun]) -> Markup {
    html! {
        @for run in runs {
            (render_styled(&run.text, &run.attrs))
        }
    }
}

/// Wrap `text` in one element per attribute, outermost first.
fn render_styled(text: &str, attrs: &[TextAttr]) -> Markup {
    let Some((first, rest)) = attrs.split_first() else {
        return html! { (text) };
    };
    let inner = render_styled(text, rest);
    match first {
        TextAttr::Bold => html! { strong { (inner) } },
        TextAttr::Italic => html! { em { (inner) } },
        TextAttr::Code => html! { code { (inner) } },
        TextAttr::Strike => html! { del { (inner) } },
        TextAttr::Link(href) => html! { a href=(href) { (inner) } },
    }
}

/// Markdown to HTML. Raw HTML in the source is emitted as escaped text.
fn markdown(text: &str) -> Markup {
    let events = Parser::new(text).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, events);
    PreEscaped(out)
}

// ============================================================================
// Layout
// ============================================================================

fn entry_meta(entry: &IndexEntry) -> Markup {
    html! {
        span.article-meta {
            @if let Some(date) = entry.date {
                " " time datetime=(date.to_rfc3339()) { (date.format("%Y-%m-%d").to_string()) }
            }
            @if !entry.tags.is_empty() {
                " in: "
                @for tag in &entry.tags {
                    span.tag { (tag) }
                }
            }
        }
    }
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link href="/main.css" rel="stylesheet";
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(breadcrumb: Markup, current: &str, has_home: bool) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb { (breadcrumb) }
            nav.site-nav {
                ul {
                    @if has_home {
                        li class=[(current.is_empty()).then_some("current")] {
                            a href="/" { "Home" }
                        }
                    }
                    li class=[(current == "archives").then_some("current")] {
                        a href={ "/" (ARCHIVE_FILE) } { "Articles" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;
    use crate::store::Origin;
    use crate::test_helpers::*;
    use chrono::DateTime;

    fn renderer() -> Renderer<'static> {
        Renderer::new("Notes", None)
    }

    fn block(kind: BlockKind, text: &str) -> Block {
        Block {
            kind,
            ..text_block(text)
        }
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    #[test]
    fn text_becomes_paragraph() {
        let html = renderer().render_blocks(&[text_block("hello")]).into_string();
        assert_eq!(html, "<p>hello</p>");
    }

    #[test]
    fn headings_by_level() {
        let html = renderer()
            .render_blocks(&[
                block(BlockKind::Header, "One"),
                block(BlockKind::SubHeader, "Two"),
                block(BlockKind::SubSubHeader, "Three"),
            ])
            .into_string();
        assert_eq!(html, "<h1>One</h1><h2>Two</h2><h3>Three</h3>");
    }

    #[test]
    fn consecutive_list_items_share_one_list() {
        let html = renderer()
            .render_blocks(&[
                block(BlockKind::BulletedList, "a"),
                block(BlockKind::BulletedList, "b"),
                text_block("between"),
                block(BlockKind::NumberedList, "c"),
            ])
            .into_string();
        assert_eq!(
            html,
            "<ul><li>a</li><li>b</li></ul><p>between</p><ol><li>c</li></ol>"
        );
    }

    #[test]
    fn code_block_carries_language_class() {
        let mut code = block(BlockKind::Code, "fn main() {}");
        code.language = Some("rust".into());
        let html = renderer().render_blocks(&[code]).into_string();
        assert_eq!(
            html,
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#
        );
    }

    #[test]
    fn page_reference_links_to_compact_id() {
        let html = renderer()
            .render_blocks(&[page_block("bbbb-cccc", "Child")])
            .into_string();
        assert!(html.contains(r#"href="/bbbbcccc.html""#));
        assert!(html.contains("Child"));
    }

    #[test]
    fn link_to_root_points_at_index() {
        let root = PageId::normalize("AAAA");
        let r = Renderer::new("Notes", Some(&root));
        let html = r.render_blocks(&[page_block("AAAA", "Home")]).into_string();
        assert!(html.contains(r#"href="/index.html""#));
    }

    #[test]
    fn unknown_blocks_are_skipped() {
        let html = renderer()
            .render_blocks(&[block(BlockKind::Other, "ignored")])
            .into_string();
        assert_eq!(html, "");
    }

    #[test]
    fn inline_attributes_nest() {
        let runs = vec![
            InlineRun {
                text: "plain ".into(),
                attrs: vec![],
            },
            InlineRun {
                text: "both".into(),
                attrs: vec![TextAttr::Link("https://x.y".into()), TextAttr::Bold],
            },
        ];
        assert_eq!(
            render_inline(&runs).into_string(),
            r#"plain <a href="https://x.y"><strong>both</strong></a>"#
        );
    }

    #[test]
    fn text_is_escaped() {
        let html = renderer()
            .render_blocks(&[text_block("<script>alert(1)</script>")])
            .into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // =========================================================================
    // Documents
    // =========================================================================

    #[test]
    fn file_name_root_is_index() {
        let root = PageId::normalize("AAAA");
        let r = Renderer::new("Notes", Some(&root));
        assert_eq!(r.file_name(&root), "index.html");
        assert_eq!(r.file_name(&PageId::normalize("BBBB")), "BBBB.html");
    }

    #[test]
    fn document_page_has_title_and_breadcrumb() {
        let doc = Document {
            id: PageId::normalize("AAAA"),
            tree: page_tree("AAAA", "My Post", vec![text_block("Body")]),
            meta: Metadata::default(),
            origin: Origin::Source,
        };
        let html = renderer().render_document(&doc).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>My Post</title>"));
        assert!(html.contains("Home</a> / My Post"));
        assert!(html.contains("<p>Body</p>"));
    }

    #[test]
    fn archive_lists_entries_with_markdown_summary() {
        let entries = vec![IndexEntry {
            id: PageId::normalize("BBBB"),
            title: "Second".into(),
            date: Some(DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z").unwrap()),
            tags: vec!["go".into(), "web".into()],
            summary: Some("Some *emphasis*".into()),
            hidden: false,
        }];
        let html = renderer().render_archive(&entries).into_string();
        assert!(html.contains(r#"href="/BBBB.html""#));
        assert!(html.contains("2020-01-01"));
        assert!(html.contains(r#"<span class="tag">go</span>"#));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn markdown_escapes_raw_html() {
        let inline = markdown("Hi <script>alert(1)</script> *there*").into_string();
        assert!(!inline.contains("<script>"));
        assert!(inline.contains("&lt;script&gt;"));
        assert!(inline.contains("<em>there</em>"));

        let block = markdown("<div onclick=\"x()\">raw</div>").into_string();
        assert!(!block.contains("<div"));
        assert!(block.contains("&lt;div"));
    }
}
