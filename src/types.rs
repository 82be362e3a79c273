//! Content tree types shared by the store, extractor, traversal and renderer.
//!
//! The same JSON shape is used for HTTP responses and cache files, so a page
//! that went through the cache is indistinguishable from a freshly fetched one.

use crate::id::PageId;
use serde::{Deserialize, Serialize};

/// One page's content: title plus an ordered list of top-level blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTree {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl PageTree {
    pub fn page_id(&self) -> PageId {
        PageId::normalize(&self.id)
    }

    /// Ids of page-reference blocks among the top-level blocks, in tree order.
    pub fn child_page_ids(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Page)
            .map(|b| b.id.clone())
            .collect()
    }
}

/// Discriminates how a block is rendered and whether it links to another page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    /// Reference to a sub-page; the block id is the child page id.
    Page,
    Header,
    SubHeader,
    SubSubHeader,
    BulletedList,
    NumberedList,
    Quote,
    Code,
    Image,
    Divider,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Link label for page references.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline: Vec<InlineRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Image URL for image blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    /// Plain text of all inline runs, formatting dropped.
    pub fn plain_text(&self) -> String {
        self.inline.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<TextAttr>,
}

impl InlineRun {
    /// A run with no formatting attributes. Only plain runs may carry
    /// metadata header lines.
    pub fn is_plain(&self) -> bool {
        self.attrs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAttr {
    Bold,
    Italic,
    Code,
    Strike,
    Link(String),
}
