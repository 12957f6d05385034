//! Offline replay of listing pages saved to disk.

use crate::error::Result;
use crate::scraper::ListingParser;
use crate::storage::RecordSink;
use anyhow::Context;
use scraper::Html;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `path` itself when it is a file, otherwise every `*.html` file inside it sorted by name.
pub fn discover_html_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.exists() {
        warn!("{:?} does not exist", path);
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).with_context(|| format!("Cannot read {:?}", path))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "html" || e == "htm") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Decode one saved page and forward its records. Returns how many were written.
pub fn load_page<W: RecordSink + ?Sized>(
    parser: &ListingParser,
    path: &Path,
    sink: &mut W,
) -> Result<usize> {
    let html = std::fs::read_to_string(path)?;
    let records = parser.records(&Html::parse_document(&html))?;
    for record in &records {
        sink.append(record)?;
    }
    info!("{:?}: {} records", path, records.len());
    Ok(records.len())
}
