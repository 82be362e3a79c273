//! Remote page source.
//!
//! The page store only needs "give me the tree for this id", so the remote
//! side sits behind the [`Source`] trait. [`HttpSource`] is the production
//! implementation: a blocking `GET {endpoint}/{id}` returning the page tree
//! as JSON. Every request/response pair is written to the diagnostic log the
//! store hands in for the duration of the fetch.

use crate::id::PageId;
use crate::types::PageTree;
use std::io::Write;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use ureq::Agent;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request for page '{id}' failed: {source}")]
    Http {
        id: PageId,
        #[source]
        source: ureq::Error,
    },
    #[error("HTTP {status} for page '{id}': {body}")]
    Status { id: PageId, status: u16, body: String },
    #[error("invalid page tree for '{id}': {source}")]
    Decode {
        id: PageId,
        #[source]
        source: serde_json::Error,
    },
    #[error("page '{0}' not found")]
    NotFound(PageId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches page trees by compact id.
///
/// Calls block until the page is returned or the fetch fails. Nothing is
/// retried; the caller decides what a failure means.
pub trait Source {
    /// `log` receives request/response detail for this one fetch.
    fn fetch(&self, id: &PageId, log: &mut dyn Write) -> Result<PageTree, FetchError>;
}

/// JSON-over-HTTP page source.
pub struct HttpSource {
    agent: Agent,
    endpoint: String,
}

impl HttpSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
        }
    }

    pub fn page_url(&self, id: &PageId) -> String {
        format!("{}/{}", self.endpoint, id)
    }
}

impl Source for HttpSource {
    fn fetch(&self, id: &PageId, log: &mut dyn Write) -> Result<PageTree, FetchError> {
        let url = self.page_url(id);
        info!("Downloading page {} from {}", id, url);
        writeln!(log, "GET {url}")?;

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|source| FetchError::Http {
                id: id.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();
        let body = body_reader
            .read_to_string()
            .map_err(|source| FetchError::Http {
                id: id.clone(),
                source,
            })?;
        writeln!(log, "{status}")?;
        writeln!(log, "{body}")?;

        match status {
            404 => Err(FetchError::NotFound(id.clone())),
            s if s >= 400 => Err(FetchError::Status {
                id: id.clone(),
                status: s,
                body,
            }),
            _ => serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                id: id.clone(),
                source,
            }),
        }
    }
}
