//! On-disk page tree cache.
//!
//! Fetching a page from the remote source is slow and rate limited, while
//! the page tree itself rarely changes between runs. The store keeps every
//! fetched tree as pretty-printed JSON so later runs can skip the network.
//!
//! # Layout
//!
//! ```text
//! cache/
//! ├── 2131b10cebf64938a1277089ff02dbe4.json
//! └── 0c896ea2efd24ec7be1d1f6e3b22d254.json
//! ```
//!
//! Files are keyed by the compact page id, so hyphenated and compact
//! spellings of an id share one entry.
//!
//! # Failure policy
//!
//! A missing file is the only cache miss. A file that exists but doesn't
//! parse is [`CacheError::Corrupt`]: silently re-fetching would hide a schema
//! drift between the cache and the code reading it. Delete the entry (or run
//! with `--no-cache`) to recover. A failed write after a successful fetch is
//! [`CacheError::Persist`]; it means the cache directory is broken.

use crate::id::PageId;
use crate::types::PageTree;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

const ENTRY_EXTENSION: &str = "json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cached page '{id}' at {path} is corrupt: {source}")]
    Corrupt {
        id: PageId,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to cache page '{id}' at {path}: {source}")]
    Persist {
        id: PageId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode page '{id}': {source}")]
    Encode {
        id: PageId,
        #[source]
        source: serde_json::Error,
    },
    #[error("IO error reading cache: {0}")]
    Io(#[from] io::Error),
}

/// Filesystem key/value store of page trees.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, id: &PageId) -> PathBuf {
        self.dir.join(format!("{id}.{ENTRY_EXTENSION}"))
    }

    /// Load a cached tree. `Ok(None)` only when there is no entry.
    pub fn get(&self, id: &PageId) -> Result<Option<PageTree>, CacheError> {
        let path = self.entry_path(id);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };
        let tree = serde_json::from_str(&content).map_err(|source| CacheError::Corrupt {
            id: id.clone(),
            path: path.clone(),
            source,
        })?;
        debug!("Cache hit for page {} at {}", id, path.display());
        Ok(Some(tree))
    }

    /// Store a tree, creating the cache directory if needed.
    pub fn put(&self, id: &PageId, tree: &PageTree) -> Result<(), CacheError> {
        let path = self.entry_path(id);
        let json = serde_json::to_string_pretty(tree).map_err(|source| CacheError::Encode {
            id: id.clone(),
            source,
        })?;
        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&path, json))
            .map_err(|source| CacheError::Persist {
                id: id.clone(),
                path,
                source,
            })
    }

    /// Delete an entry. Returns whether a file was removed; other failures
    /// are logged and otherwise ignored.
    pub fn remove(&self, id: &PageId) -> bool {
        remove_file_logged(&self.entry_path(id))
    }

    /// Ids of every cached page, sorted.
    pub fn ids(&self) -> Vec<PageId> {
        let mut ids: Vec<PageId> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext == ENTRY_EXTENSION)
            })
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .map(|s| PageId::normalize(&s.to_string_lossy()))
            })
            .collect();
        ids.sort();
        ids
    }
}

/// Remove a file, treating "already gone" as success.
pub(crate) fn remove_file_logged(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            false
        }
    }
}

/// Where each page of a run came from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub fetches: u32,
    pub failures: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn failure(&mut self) {
        self.failures += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.fetches + self.failures
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.hits > 0 {
            parts.push(format!("{} cached", self.hits));
        }
        parts.push(format!("{} fetched", self.fetches));
        if self.failures > 0 {
            parts.push(format!("{} failed", self.failures));
        }
        if parts.len() > 1 {
            write!(f, "{} ({} total)", parts.join(", "), self.total())
        } else {
            f.write_str(&parts[0])
        }
    }
}
