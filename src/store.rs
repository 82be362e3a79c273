//! Page store: resolve a page id to its content tree, cache first.
//!
//! ```text
//! resolve(id)
//!   ├── use_cache && cache has id  →  (tree, Origin::Cache)
//!   └── otherwise
//!         open log/<id>.log.txt
//!         source.fetch(id, log)        ── Err → FetchError, nothing cached
//!         close log
//!         cache.put(id, tree)          ── Err → CacheError::Persist (fatal)
//!         →  (tree, Origin::Source)
//! ```
//!
//! The diagnostic log exists only around a remote fetch. Cache hits never
//! touch it, and the handle is dropped before `resolve` returns on every path.

use crate::cache::{self, CacheError, CacheStats, PageCache};
use crate::id::PageId;
use crate::source::{FetchError, Source};
use crate::types::PageTree;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Where a resolved tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Source,
}

pub struct PageStore {
    source: Box<dyn Source>,
    cache: PageCache,
    log_dir: PathBuf,
    use_cache: bool,
    stats: CacheStats,
}

impl PageStore {
    pub fn new(
        source: Box<dyn Source>,
        cache: PageCache,
        log_dir: impl Into<PathBuf>,
        use_cache: bool,
    ) -> Self {
        Self {
            source,
            cache,
            log_dir: log_dir.into(),
            use_cache,
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn log_path(&self, id: &PageId) -> PathBuf {
        self.log_dir.join(format!("{id}.log.txt"))
    }

    pub fn resolve(&mut self, id: &PageId) -> Result<(PageTree, Origin), StoreError> {
        if self.use_cache
            && let Some(tree) = self.cache.get(id)?
        {
            info!("Got page {} from cache {}", id, self.cache.dir().display());
            self.stats.hit();
            return Ok((tree, Origin::Cache));
        }

        let fetched = {
            let mut log = open_fetch_log(&self.log_path(id));
            self.source.fetch(id, log.as_mut())
        };
        let tree = match fetched {
            Ok(tree) => tree,
            Err(e) => {
                self.stats.failure();
                return Err(e.into());
            }
        };

        self.cache.put(id, &tree)?;
        self.stats.fetch();
        Ok((tree, Origin::Source))
    }

    /// Delete every artifact kept for `id` so the next run re-fetches it.
    pub fn discard(&self, id: &PageId) {
        let removed_tree = self.cache.remove(id);
        let removed_log = cache::remove_file_logged(&self.log_path(id));
        info!(
            "Discarded cached artifacts for page {} (tree: {}, log: {})",
            id, removed_tree, removed_log
        );
    }
}

/// Open the per-fetch diagnostic log. A log that can't be created is not
/// worth failing the fetch over; detail goes to a sink instead.
fn open_fetch_log(path: &Path) -> Box<dyn Write> {
    let file = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| File::create(path));
    match file {
        Ok(f) => Box::new(f),
        Err(e) => {
            warn!("Failed to create fetch log {}: {}", path.display(), e);
            Box::new(io::sink())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(source: MemorySource, tmp: &TempDir, use_cache: bool) -> PageStore {
        PageStore::new(
            Box::new(source),
            PageCache::new(tmp.path().join("cache")),
            tmp.path().join("log"),
            use_cache,
        )
    }

    fn id(s: &str) -> PageId {
        PageId::normalize(s)
    }

    #[test]
    fn miss_fetches_and_persists() {
        let tmp = TempDir::new().unwrap();
        let source = MemorySource::new().with_page(page_tree("AAAA", "Home", vec![]));
        let calls = source.calls();
        let mut store = store_with(source, &tmp, true);

        let (tree, origin) = store.resolve(&id("AAAA")).unwrap();

        assert_eq!(origin, Origin::Source);
        assert_eq!(tree.title, "Home");
        assert_eq!(calls.get(), 1);
        assert_eq!(store.cache().get(&id("AAAA")).unwrap(), Some(tree));
        assert_eq!(store.stats().fetches, 1);
    }

    #[test]
    fn second_resolve_is_served_from_cache() {
        let tmp = TempDir::new().unwrap();
        let source = MemorySource::new().with_page(page_tree("AAAA", "Home", vec![]));
        let calls = source.calls();
        let mut store = store_with(source, &tmp, true);

        store.resolve(&id("AAAA")).unwrap();
        let (_, origin) = store.resolve(&id("AAAA")).unwrap();

        assert_eq!(origin, Origin::Cache);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.stats().hits, 1);
    }

    #[test]
    fn cache_disabled_always_fetches() {
        let tmp = TempDir::new().unwrap();
        let source = MemorySource::new().with_page(page_tree("AAAA", "Home", vec![]));
        let calls = source.calls();
        let mut store = store_with(source, &tmp, false);

        store.resolve(&id("AAAA")).unwrap();
        let (_, origin) = store.resolve(&id("AAAA")).unwrap();

        assert_eq!(origin, Origin::Source);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn fetch_failure_caches_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_with(MemorySource::new(), &tmp, true);

        let err = store.resolve(&id("AAAA")).unwrap_err();

        assert!(matches!(err, StoreError::Fetch(FetchError::NotFound(_))));
        assert_eq!(store.cache().get(&id("AAAA")).unwrap(), None);
        assert_eq!(store.stats().failures, 1);
    }

    #[test]
    fn corrupt_cache_entry_is_fatal_and_skips_source() {
        let tmp = TempDir::new().unwrap();
        let source = MemorySource::new().with_page(page_tree("AAAA", "Home", vec![]));
        let calls = source.calls();
        let store_dir = tmp.path().join("cache");
        fs::create_dir_all(&store_dir).unwrap();
        fs::write(store_dir.join("AAAA.json"), "{ broken").unwrap();
        let mut store = store_with(source, &tmp, true);

        let err = store.resolve(&id("AAAA")).unwrap_err();

        assert!(matches!(err, StoreError::Cache(CacheError::Corrupt { .. })));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn fetch_log_written_on_fetch_only() {
        let tmp = TempDir::new().unwrap();
        let source = MemorySource::new().with_page(page_tree("AAAA", "Home", vec![]));
        let mut store = store_with(source, &tmp, true);

        store.resolve(&id("AAAA")).unwrap();
        let log_path = store.log_path(&id("AAAA"));
        let logged = fs::read_to_string(&log_path).unwrap();
        assert!(logged.contains("fetch AAAA"));

        fs::remove_file(&log_path).unwrap();
        store.resolve(&id("AAAA")).unwrap();
        assert!(!log_path.exists());
    }

    #[test]
    fn fetch_log_kept_for_failed_fetch() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_with(MemorySource::new(), &tmp, true);
        store.resolve(&id("AAAA")).unwrap_err();
        assert!(store.log_path(&id("AAAA")).exists());
    }

    #[test]
    fn discard_removes_tree_and_log() {
        let tmp = TempDir::new().unwrap();
        let source = MemorySource::new().with_page(page_tree("AAAA", "Home", vec![]));
        let mut store = store_with(source, &tmp, true);
        store.resolve(&id("AAAA")).unwrap();

        store.discard(&id("AAAA"));

        assert_eq!(store.cache().get(&id("AAAA")).unwrap(), None);
        assert!(!store.log_path(&id("AAAA")).exists());
    }
}
