//! Page identifier parsing and normalization.
//!
//! Remote pages are keyed by a 32-character hex identifier that shows up in
//! two textual forms:
//!
//! - hyphenated: `2131b10c-ebf6-4938-a127-7089ff02dbe4`
//! - compact:    `2131b10cebf64938a1277089ff02dbe4`
//!
//! Both forms name the same page. Everything that stores, caches or compares
//! an identifier (visited set, cache file name, output file name) goes through
//! [`normalize`] so the compact form is the only one that ever hits disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum IdError {
    #[error("empty page id")]
    Empty,
    #[error("invalid character {ch:?} in page id '{raw}'")]
    InvalidChar { raw: String, ch: char },
}

/// Strip every dash, turning the hyphenated form into the compact one.
///
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    raw.trim().replace('-', "")
}

/// A page identifier in compact form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Normalize without validating. Used for ids coming out of remote
    /// content trees, which are trusted to be well-formed.
    pub fn normalize(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// Normalize and validate user-supplied input (config seeds, CLI args).
    ///
    /// - `"2131b10c-ebf6-4938-a127-7089ff02dbe4"` → `2131b10cebf64938a1277089ff02dbe4`
    /// - `"AAAA"` → `AAAA`
    /// - `""` → [`IdError::Empty`]
    /// - `"abc/def"` → [`IdError::InvalidChar`]
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let compact = normalize(raw);
        if compact.is_empty() {
            return Err(IdError::Empty);
        }
        if let Some(ch) = compact.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidChar {
                raw: raw.to_string(),
                ch,
            });
        }
        Ok(Self(compact))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
