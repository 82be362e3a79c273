//! Run configuration.
//!
//! Handles loading and validating `blockpress.toml`. The file is optional:
//! stock defaults are used for anything it leaves out, and command-line
//! flags override the merged result.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Notes"           # Site title used on the archive page
//! recursive = false         # Follow links to sub-pages
//! use_cache = true          # Serve pages from cache_dir when present
//! seeds = []                # Page ids to start from (either id form)
//! output_dir = "www"        # Rendered site
//! cache_dir = "cache"       # Cached page trees, one JSON file per page
//! log_dir = "log"           # Per-fetch request/response logs
//!
//! [source]
//! endpoint = "http://localhost:8080/pages"  # GET {endpoint}/{id}
//! timeout_secs = 30
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::id::{IdError, PageId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "blockpress.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid seed: {0}")]
    Seed(#[from] IdError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    /// Discover and visit page references found on each page.
    pub recursive: bool,
    /// Resolve pages from the cache before asking the source.
    pub use_cache: bool,
    /// Traversal start points, visited in order.
    pub seeds: Vec<String>,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    pub source: SourceConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Notes".to_string(),
            recursive: false,
            use_cache: true,
            seeds: Vec::new(),
            output_dir: PathBuf::from("www"),
            cache_dir: PathBuf::from("cache"),
            log_dir: PathBuf::from("log"),
            source: SourceConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = &self.source.endpoint;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source.endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "source.timeout_secs must be greater than 0".into(),
            ));
        }
        self.seed_ids()?;
        Ok(())
    }

    /// Seeds parsed as page ids, in configured order.
    pub fn seed_ids(&self) -> Result<Vec<PageId>, ConfigError> {
        self.seeds
            .iter()
            .map(|s| PageId::parse(s).map_err(ConfigError::from))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Base URL; pages are fetched from `{endpoint}/{id}`.
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/pages".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load `path` over the stock defaults, rejecting unknown keys.
///
/// The result is not validated yet: CLI overrides are applied first, then
/// the caller runs [`SiteConfig::validate`].
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    Ok(merged.try_into()?)
}

/// A fully commented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r#"# blockpress configuration
# ========================
#
# Every key is optional. Values shown are the defaults.

# Site title, used on the archive page.
title = "Notes"

# Follow links to sub-pages found on each visited page.
recursive = false

# Serve pages from cache_dir when a cached copy exists.
# A cached copy that fails to parse aborts the run; delete it to re-fetch.
use_cache = true

# Page ids to start from. Hyphenated and compact forms are both accepted.
# The first page that loads becomes index.html.
seeds = []

# Where the rendered site is written.
output_dir = "www"

# Cached page trees, one JSON file per page id.
cache_dir = "cache"

# Request/response log for each remote fetch, one file per page id.
log_dir = "log"

[source]
# Pages are fetched with GET {endpoint}/{id} and must return a JSON page tree.
endpoint = "http://localhost:8080/pages"

# Per-request timeout in seconds.
timeout_secs = 30
"#
}
