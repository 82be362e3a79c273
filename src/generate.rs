//! Writing the rendered site to disk.
//!
//! ## Output Structure
//!
//! ```text
//! www/
//! ├── index.html          # Root page (first page loaded)
//! ├── archives.html       # Listing, newest first
//! ├── main.css
//! ├── 0c896ea2efd24ec7be1d1f6e3b22d254.html
//! └── ...                 # One file per other visited page
//! ```
//!
//! Every visited page is written, including `hidden` and `notimportant`
//! ones; those statuses only shape the listing and navigation.

use crate::id::PageId;
use crate::index::IndexEntry;
use crate::render::{ARCHIVE_FILE, CSS, Renderer};
use crate::traverse::Traversal;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One written page, for CLI reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenPage {
    pub id: PageId,
    pub title: String,
    pub file: String,
    pub hidden: bool,
}

#[derive(Debug, Default)]
pub struct SiteSummary {
    pub pages: Vec<WrittenPage>,
    pub listed: usize,
}

pub fn write_site(
    traversal: &Traversal,
    entries: &[IndexEntry],
    output_dir: &Path,
    site_title: &str,
) -> Result<SiteSummary, GenerateError> {
    create_dir(output_dir)?;
    let renderer = Renderer::new(site_title, traversal.root().map(|d| &d.id));
    let mut summary = SiteSummary::default();

    for doc in &traversal.documents {
        let file = renderer.file_name(&doc.id);
        let html = renderer.render_document(doc);
        write(output_dir, &file, &html.into_string())?;
        debug!("Wrote {} for page {}", file, doc.id);
        summary.pages.push(WrittenPage {
            id: doc.id.clone(),
            title: doc.title().to_string(),
            file,
            hidden: doc.meta.is_hidden(),
        });
    }

    write(
        output_dir,
        ARCHIVE_FILE,
        &renderer.render_archive(entries).into_string(),
    )?;
    summary.listed = entries.len();

    write(output_dir, "main.css", CSS)?;

    Ok(summary)
}

fn create_dir(dir: &Path) -> Result<(), GenerateError> {
    fs::create_dir_all(dir).map_err(|source| GenerateError::Io {
        path: dir.display().to_string(),
        source,
    })
}

fn write(dir: &Path, file: &str, content: &str) -> Result<(), GenerateError> {
    let path = dir.join(file);
    fs::write(&path, content).map_err(|source| GenerateError::Io {
        path: path.display().to_string(),
        source,
    })
}
