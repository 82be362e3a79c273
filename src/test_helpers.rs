//! Shared test utilities for the blockpress test suite.
//!
//! Builders for page trees and blocks, plus [`MemorySource`], an in-memory
//! [`Source`] that counts fetches so tests can tell cache hits from remote
//! calls.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = MemorySource::new()
//!     .with_page(page_tree("AAAA", "Home", vec![page_block("BBBB", "Child")]))
//!     .with_page(page_tree("BBBB", "Child", vec![text_block("Body")]));
//! let calls = source.calls();
//! // ... hand `Box::new(source)` to a PageStore ...
//! assert_eq!(calls.get(), 2);
//! ```

use std::cell::Cell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::id::PageId;
use crate::source::{FetchError, Source};
use crate::types::{Block, BlockKind, InlineRun, PageTree, TextAttr};

// =========================================================================
// Tree builders
// =========================================================================

fn block(id: String, kind: BlockKind) -> Block {
    Block {
        id,
        kind,
        title: String::new(),
        inline: Vec::new(),
        language: None,
        source: None,
        children: Vec::new(),
    }
}

/// A text block holding one plain run. The block id is derived from the
/// text, so equal texts produce equal blocks.
pub fn text_block(text: &str) -> Block {
    Block {
        inline: vec![InlineRun {
            text: text.to_string(),
            attrs: Vec::new(),
        }],
        ..block(format!("text:{text}"), BlockKind::Text)
    }
}

/// A text block whose single run carries `attr`.
pub fn formatted_text_block(text: &str, attr: TextAttr) -> Block {
    Block {
        inline: vec![InlineRun {
            text: text.to_string(),
            attrs: vec![attr],
        }],
        ..block(format!("text:{text}"), BlockKind::Text)
    }
}

/// A reference to another page.
pub fn page_block(id: &str, title: &str) -> Block {
    Block {
        title: title.to_string(),
        ..block(id.to_string(), BlockKind::Page)
    }
}

pub fn page_tree(id: &str, title: &str, blocks: Vec<Block>) -> PageTree {
    PageTree {
        id: id.to_string(),
        title: title.to_string(),
        blocks,
    }
}

// =========================================================================
// In-memory source
// =========================================================================

/// Serves page trees from memory, keyed by normalized id.
///
/// Each fetch writes `fetch <id>` to the log it is handed, including fetches
/// of unknown pages, which fail with [`FetchError::NotFound`].
#[derive(Default)]
pub struct MemorySource {
    pages: HashMap<PageId, PageTree>,
    calls: Rc<Cell<u32>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, tree: PageTree) -> Self {
        self.pages.insert(tree.page_id(), tree);
        self
    }

    /// Shared fetch counter; stays readable after the source is boxed.
    pub fn calls(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.calls)
    }
}

impl Source for MemorySource {
    fn fetch(&self, id: &PageId, log: &mut dyn Write) -> Result<PageTree, FetchError> {
        self.calls.set(self.calls.get() + 1);
        writeln!(log, "fetch {id}")?;
        self.pages
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}
