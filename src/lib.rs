//! # Blockpress
//!
//! Turns a graph of block-structured pages, served by a remote page API,
//! into a static site. Pages are fetched once and cached on disk; later runs
//! read the cache and only go to the network for pages they have not seen.
//!
//! # Architecture: Load, Walk, Assemble, Write
//!
//! ```text
//! 1. Load      id        →  Document     (cache or remote, then header extraction)
//! 2. Walk      seeds     →  Traversal    (breadth-first, each page once)
//! 3. Assemble  documents →  IndexEntry[] (listing filter + newest-first order)
//! 4. Write     traversal →  www/         (one HTML file per page + archives)
//! ```
//!
//! Each stage takes the previous stage's output as plain data. The remote
//! side is behind the [`source::Source`] trait, so everything up to the
//! HTTP call is testable with an in-memory source.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`id`] | Page id normalization: hyphenated and compact forms map to one key |
//! | [`types`] | The page tree wire format: `PageTree`, `Block`, inline runs |
//! | [`metadata`] | Parses the `Key: value` header at the top of a page and strips it |
//! | [`cache`] | One JSON file per page id, plus hit/fetch counters |
//! | [`source`] | `Source` trait and the blocking HTTP implementation |
//! | [`store`] | Cache-first page resolution with per-fetch diagnostic logs |
//! | [`loader`] | Store + metadata extraction, with cleanup on bad headers |
//! | [`traverse`] | Breadth-first walk with a visited set and root selection |
//! | [`index`] | Listing entries: drops `notimportant` pages, sorts by date |
//! | [`render`] | Maud templates for pages and the archive listing |
//! | [`generate`] | Writes the rendered site to the output directory |
//! | [`config`] | `blockpress.toml` loading over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Cache Is the Source of Truth
//!
//! A page found in the cache is never re-fetched, so a run with a warm cache
//! needs no network at all. A corrupt cache entry aborts the run instead of
//! silently falling back to the network: the operator deletes the file and
//! the next run fetches it again.
//!
//! ## Bad Headers Are Fatal, Missing Pages Are Not
//!
//! A page that cannot be fetched is skipped and reported. A page whose header
//! uses an unknown key stops the whole run, because publishing it would leak
//! the header into the page body. Its cache entry and fetch log are removed
//! so the fixed page is picked up on the next run.

pub mod cache;
pub mod config;
pub mod generate;
pub mod id;
pub mod index;
pub mod loader;
pub mod metadata;
pub mod output;
pub mod render;
pub mod source;
pub mod store;
pub mod traverse;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
