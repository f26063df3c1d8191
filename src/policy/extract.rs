//! Page Extraction Module
//!
//! Discovers policy PDFs in a directory and turns them into per-page text.

use crate::errors::{RiskError, RiskResult};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Pages whose trimmed text is this short or shorter are indexed as empty.
pub const MIN_PAGE_CHARS: usize = 30;

/// Source of page texts for the policy index.
pub trait PageExtractor: Send + Sync {
    /// Whether this extractor handles `path`. Defaults to a case-insensitive `.pdf` match.
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }

    /// Raw text of every page, in page order.
    fn extract_pages(&self, path: &Path) -> RiskResult<Vec<String>>;
}

/// PDF text extraction backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PageExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> RiskResult<Vec<String>> {
        let doc = lopdf::Document::load(path).map_err(|e| RiskError::pdf(path, e))?;

        // get_pages() is a BTreeMap keyed by 1-based page number.
        let pages = doc
            .get_pages()
            .keys()
            .map(|&number| match doc.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("No text on page {} of {:?}: {}", number, path, e);
                    String::new()
                }
            })
            .collect();

        Ok(pages)
    }
}

/// Keep a page only if it carries enough text to be worth indexing.
pub fn keep_page(text: String) -> String {
    if text.trim().chars().count() > MIN_PAGE_CHARS {
        text
    } else {
        String::new()
    }
}

/// Files in `dir` (not recursive) the extractor accepts, sorted by file name.
pub fn discover_documents(dir: &Path, extractor: &dyn PageExtractor) -> Vec<PathBuf> {
    log::debug!("Collecting policy documents from: {:?}", dir);

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Error accessing entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && extractor.accepts(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    log::debug!("Collected {} policy documents", files.len());
    files
}

/// A document that was read successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub file: String,
    pub pages: Vec<String>,
}

/// Extract all documents in parallel. Unreadable files are logged and skipped;
/// the result keeps the order of `files`.
pub fn extract_documents(files: &[PathBuf], extractor: &dyn PageExtractor) -> Vec<ExtractedDocument> {
    files
        .par_iter()
        .filter_map(|path| {
            let file = path.file_name()?.to_string_lossy().into_owned();
            match extractor.extract_pages(path) {
                Ok(pages) => Some(ExtractedDocument {
                    file,
                    pages: pages.into_iter().map(keep_page).collect(),
                }),
                Err(e) => {
                    log::warn!("Skipping unreadable policy document {}: {}", file, e);
                    None
                }
            }
        })
        .collect()
}

/// Reads plain-text files whose pages are separated by form feeds.
#[cfg(test)]
pub(crate) struct FormFeedExtractor;

#[cfg(test)]
impl PageExtractor for FormFeedExtractor {
    fn extract_pages(&self, path: &Path) -> RiskResult<Vec<String>> {
        let text = std::fs::read_to_string(path).map_err(|e| RiskError::io(e, path.to_path_buf()))?;
        Ok(text.split('\x0c').map(str::to_string).collect())
    }
}
