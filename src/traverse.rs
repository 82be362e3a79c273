//! Breadth-first walk of the page graph.
//!
//! Starting from the configured seeds, pages are loaded one at a time from a
//! FIFO [`PendingQueue`]. A page is processed at most once per run: the id is
//! parsed when it is popped and checked against the [`VisitedSet`]. Child
//! references are appended without checking, so the queue can briefly hold
//! duplicates; they are dropped when they reach the front.
//!
//! ```text
//! seeds → queue ─pop→ parse ─malformed→ record, continue
//!                        │
//!                        ▼
//!                    visited? ─yes→ drop
//!                                    │ no
//!                                    ▼
//!                              mark, load ─fetch error→ record, continue
//!                                    │           └─fatal→ abort run
//!                                    ▼
//!                       emit document; recursive? → push child page ids
//! ```
//!
//! The first document that loads successfully is the root. Cycles terminate
//! through the visited set; nothing bounds depth.

use crate::id::PageId;
use crate::loader::{Document, DocumentLoader, LoadError};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
#[error("aborting on page '{id}': {source}")]
pub struct TraverseError {
    pub id: PageId,
    #[source]
    pub source: LoadError,
}

/// Raw ids waiting to be visited, in discovery order.
#[derive(Debug, Default)]
pub struct PendingQueue {
    ids: VecDeque<String>,
}

impl PendingQueue {
    pub fn new<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: seeds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push(&mut self, id: impl Into<String>) {
        self.ids.push_back(id.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.ids.pop_front()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Normalized ids already processed this run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    ids: HashSet<PageId>,
}

impl VisitedSet {
    /// Mark `id` visited. Returns false if it already was.
    pub fn insert(&mut self, id: PageId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &PageId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A page that could not be fetched; the run carried on without it.
///
/// `id` is the reference as found, since a malformed one has no [`PageId`].
#[derive(Debug)]
pub struct Failure {
    pub id: String,
    pub error: LoadError,
}

/// Everything one traversal produced.
#[derive(Debug, Default)]
pub struct Traversal {
    /// Loaded documents in visit order.
    pub documents: Vec<Document>,
    pub failures: Vec<Failure>,
    pub visited: VisitedSet,
}

impl Traversal {
    /// The first successfully loaded document.
    pub fn root(&self) -> Option<&Document> {
        self.documents.first()
    }

    pub fn is_root(&self, id: &PageId) -> bool {
        self.root().is_some_and(|d| &d.id == id)
    }
}

/// Walk the graph from `queue` until it drains.
///
/// Fetch failures and malformed references are recorded in
/// [`Traversal::failures`]. Any other load error stops the walk and is
/// returned.
pub fn traverse(
    loader: &mut DocumentLoader,
    mut queue: PendingQueue,
    recursive: bool,
) -> Result<Traversal, TraverseError> {
    let mut result = Traversal::default();

    while let Some(raw) = queue.pop() {
        // Ids end up in file names, so anything that isn't a hex key stops here.
        let id = match PageId::parse(&raw) {
            Ok(id) => id,
            Err(e) => {
                warn!("Skipping malformed page reference '{}': {}", raw, e);
                if !result.failures.iter().any(|f| f.id == raw) {
                    result.failures.push(Failure {
                        id: raw,
                        error: LoadError::InvalidId(e),
                    });
                }
                continue;
            }
        };
        if !result.visited.insert(id.clone()) {
            debug!("Skipping already visited page {}", id);
            continue;
        }

        let doc = match loader.load(&id) {
            Ok(doc) => doc,
            Err(error) if !error.is_fatal() => {
                warn!("Failed to load page {}: {}", id, error);
                result.failures.push(Failure {
                    id: id.to_string(),
                    error,
                });
                continue;
            }
            Err(source) => return Err(TraverseError { id, source }),
        };

        if recursive {
            let children = doc.tree.child_page_ids();
            if !children.is_empty() {
                info!("Page {} links {} sub-pages", id, children.len());
            }
            for child in children {
                queue.push(child);
            }
        }
        result.documents.push(doc);
    }

    Ok(result)
}
