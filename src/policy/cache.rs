//! On-disk index artifacts
//!
//! Four JSON files live next to the policy documents: the document-term
//! matrix, the fitted vectorizer, the (file, page) list and the page texts.
//! They are only trusted together; any missing, corrupt or inconsistent
//! artifact invalidates the whole cache.

use super::vectorizer::{DocumentTermMatrix, TfidfVectorizer};
use crate::errors::{RiskError, RiskResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "policy_index.json";
pub const VECTORIZER_FILE: &str = "policy_vectorizer.json";
pub const META_FILE: &str = "policy_meta.json";
pub const DOCS_FILE: &str = "policy_docs.json";

/// Origin of one indexed page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub file: String,
    /// 1-based
    pub page: u32,
}

#[derive(Debug, Clone)]
pub struct CachePaths {
    pub index: PathBuf,
    pub vectorizer: PathBuf,
    pub meta: PathBuf,
    pub docs: PathBuf,
}

impl CachePaths {
    pub fn new(dir: &Path) -> Self {
        Self {
            index: dir.join(INDEX_FILE),
            vectorizer: dir.join(VECTORIZER_FILE),
            meta: dir.join(META_FILE),
            docs: dir.join(DOCS_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [&self.index, &self.vectorizer, &self.meta, &self.docs]
    }

    pub fn all_present(&self) -> bool {
        self.all().iter().all(|p| p.is_file())
    }

    /// Delete whichever artifacts exist.
    pub fn remove_all(&self) -> RiskResult<()> {
        for path in self.all() {
            if path.exists() {
                fs::remove_file(path).map_err(|e| RiskError::io(e, path.to_path_buf()))?;
                log::debug!("Removed cache artifact {:?}", path);
            }
        }
        Ok(())
    }
}

/// Everything needed to answer queries without touching the PDFs.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedIndex {
    pub matrix: DocumentTermMatrix,
    pub vectorizer: TfidfVectorizer,
    pub meta: Vec<PageRef>,
    pub docs: Vec<String>,
}

impl CachedIndex {
    fn is_consistent(&self) -> bool {
        self.meta.len() == self.docs.len()
            && self.matrix.len() == self.docs.len()
            && self.matrix.n_terms == self.vectorizer.vocabulary_len()
            && self.vectorizer.is_fitted()
            && self.vectorizer.is_consistent()
            && self.matrix.is_consistent()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> RiskResult<T> {
    let bytes = fs::read(path).map_err(|e| RiskError::io(e, path.to_path_buf()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RiskResult<()> {
    let bytes = serde_json::to_vec(value)?;
    fs::write(path, bytes).map_err(|e| RiskError::io(e, path.to_path_buf()))
}

/// Load the cached index, or `None` if it must be rebuilt.
pub fn load(paths: &CachePaths) -> Option<CachedIndex> {
    if !paths.all_present() {
        log::debug!("Policy index cache incomplete, rebuilding");
        return None;
    }

    let loaded = (|| -> RiskResult<CachedIndex> {
        Ok(CachedIndex {
            matrix: read_json(&paths.index)?,
            vectorizer: read_json(&paths.vectorizer)?,
            meta: read_json(&paths.meta)?,
            docs: read_json(&paths.docs)?,
        })
    })();

    match loaded {
        Ok(cached) if cached.is_consistent() => Some(cached),
        Ok(_) => {
            log::warn!("Policy index cache is inconsistent, rebuilding");
            None
        }
        Err(e) => {
            log::warn!("Policy index cache unreadable, rebuilding: {}", e);
            None
        }
    }
}

pub fn store(paths: &CachePaths, cached: &CachedIndex) -> RiskResult<()> {
    write_json(&paths.index, &cached.matrix)?;
    write_json(&paths.vectorizer, &cached.vectorizer)?;
    write_json(&paths.meta, &cached.meta)?;
    write_json(&paths.docs, &cached.docs)?;
    log::debug!("Wrote policy index cache ({} pages)", cached.docs.len());
    Ok(())
}
