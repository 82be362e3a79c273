//! Document loader: one page id in, one fully resolved [`Document`] out.
//!
//! Resolves the tree through the [`PageStore`] and runs metadata extraction
//! on it exactly once. The cache holds the tree as fetched, header included,
//! so every load re-extracts from the original tree.
//!
//! When extraction hits an unknown metadata key, the page's cache entry and
//! fetch log are deleted before the error is returned. The page then has to
//! be fixed at the source and is re-fetched cleanly next run.

use crate::id::{IdError, PageId};
use crate::metadata::{self, Metadata, MetadataError};
use crate::store::{Origin, PageStore, StoreError};
use crate::types::PageTree;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// A page reference that is not a valid id. Never loaded.
    #[error(transparent)]
    InvalidId(#[from] IdError),
}

impl LoadError {
    /// Fetch failures and malformed references are recoverable; everything
    /// else aborts the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Store(StoreError::Fetch(_)) | Self::InvalidId(_))
    }
}

/// A loaded page: header-stripped content plus its metadata.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: PageId,
    pub tree: PageTree,
    pub meta: Metadata,
    pub origin: Origin,
}

impl Document {
    pub fn title(&self) -> &str {
        &self.tree.title
    }
}

pub struct DocumentLoader {
    store: PageStore,
}

impl DocumentLoader {
    pub fn new(store: PageStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    pub fn load(&mut self, id: &PageId) -> Result<Document, LoadError> {
        let (tree, origin) = self.store.resolve(id)?;
        let (meta, tree) = match metadata::extract(tree) {
            Ok(extracted) => extracted,
            Err(e) => {
                if matches!(e, MetadataError::UnknownKey { .. }) {
                    warn!("Unknown metadata in page {}, discarding cached copy", id);
                    self.store.discard(id);
                }
                return Err(e.into());
            }
        };
        Ok(Document {
            id: id.clone(),
            tree,
            meta,
            origin,
        })
    }
}
