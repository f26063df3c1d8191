//! Policy Retrieval Index
//!
//! Builds a page-level TF-IDF index over a directory of policy PDFs, persists
//! it next to the documents and answers free-text queries with ranked,
//! evidence-refined hits.
//!
//! ## Lifecycle
//! 1. `open` loads the cached artifacts if all four are present and consistent
//! 2. Otherwise the PDFs are extracted (in parallel), vectorized and cached
//! 3. `rebuild` discards the cache and re-extracts unconditionally
//!
//! An index over an empty or unusable corpus is valid; every search on it
//! returns no hits.

pub mod cache;
pub mod evidence;
pub mod extract;
pub mod text;
pub mod vectorizer;

use crate::errors::{RiskError, RiskResult};
use crate::models::PolicyHit;
use cache::{CachePaths, CachedIndex, PageRef};
use extract::{discover_documents, extract_documents, LopdfExtractor, PageExtractor};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use text::{normalize_text, Tokenizer};
use vectorizer::{DocumentTermMatrix, TfidfVectorizer};

pub use evidence::{Evidence, SNIPPET_MAX_CHARS};
pub use extract::MIN_PAGE_CHARS;

/// Hits returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 7;

/// Fitted model, present only when the vocabulary is non-empty.
#[derive(Debug, Clone)]
struct Model {
    vectorizer: TfidfVectorizer,
    matrix: DocumentTermMatrix,
}

pub struct PolicyIndex {
    policy_dir: PathBuf,
    cache: CachePaths,
    extractor: Box<dyn PageExtractor>,
    pub(crate) tokenizer: Tokenizer,
    docs: Vec<String>,
    meta: Vec<PageRef>,
    pages: HashMap<PageRef, usize>,
    model: Option<Model>,
}

impl PolicyIndex {
    /// Open the index for `policy_dir`, creating the directory if needed.
    pub fn open(policy_dir: impl Into<PathBuf>) -> RiskResult<Self> {
        Self::open_with(policy_dir, Box::new(LopdfExtractor))
    }

    pub fn open_with(policy_dir: impl Into<PathBuf>, extractor: Box<dyn PageExtractor>) -> RiskResult<Self> {
        Self::init(policy_dir.into(), extractor, false)
    }

    /// Open the index, ignoring any existing cache. Builds exactly once.
    pub fn open_rebuilt(policy_dir: impl Into<PathBuf>) -> RiskResult<Self> {
        Self::open_rebuilt_with(policy_dir, Box::new(LopdfExtractor))
    }

    pub fn open_rebuilt_with(policy_dir: impl Into<PathBuf>, extractor: Box<dyn PageExtractor>) -> RiskResult<Self> {
        Self::init(policy_dir.into(), extractor, true)
    }

    fn init(policy_dir: PathBuf, extractor: Box<dyn PageExtractor>, rebuild: bool) -> RiskResult<Self> {
        fs::create_dir_all(&policy_dir).map_err(|e| RiskError::io(e, policy_dir.clone()))?;

        let mut index = Self {
            cache: CachePaths::new(&policy_dir),
            policy_dir,
            extractor,
            tokenizer: Tokenizer::new()?,
            docs: Vec::new(),
            meta: Vec::new(),
            pages: HashMap::new(),
            model: None,
        };

        if rebuild {
            log::info!("Rebuilding policy index in {:?}", index.policy_dir);
            index.cache.remove_all()?;
        }

        match cache::load(&index.cache) {
            Some(cached) => {
                log::info!("Loaded policy index from cache ({} pages)", cached.docs.len());
                index.install(cached.docs, cached.meta, Some(cached.vectorizer), Some(cached.matrix));
            }
            None => index.build()?,
        }

        Ok(index)
    }

    /// Delete all cached artifacts and rebuild from the documents on disk.
    pub fn rebuild(&mut self) -> RiskResult<()> {
        log::info!("Rebuilding policy index in {:?}", self.policy_dir);
        self.cache.remove_all()?;
        self.build()
    }

    fn build(&mut self) -> RiskResult<()> {
        let files = discover_documents(&self.policy_dir, self.extractor.as_ref());
        let extracted = extract_documents(&files, self.extractor.as_ref());

        let mut docs = Vec::new();
        let mut meta = Vec::new();
        for document in extracted {
            for (i, page_text) in document.pages.into_iter().enumerate() {
                docs.push(page_text);
                meta.push(PageRef {
                    file: document.file.clone(),
                    page: i as u32 + 1,
                });
            }
        }

        if docs.is_empty() {
            log::info!("No policy pages found in {:?}; index is empty", self.policy_dir);
            self.install(docs, meta, None, None);
            return Ok(());
        }

        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&docs);

        if !vectorizer.is_fitted() {
            log::warn!(
                "Policy corpus of {} pages produced no usable vocabulary; searches will return nothing",
                docs.len()
            );
            self.install(docs, meta, None, None);
            return Ok(());
        }

        let cached = CachedIndex {
            matrix,
            vectorizer,
            meta,
            docs,
        };
        if let Err(e) = cache::store(&self.cache, &cached) {
            log::warn!("Could not persist policy index: {}", e);
        }

        log::info!(
            "Indexed {} pages from {} documents ({} n-grams)",
            cached.docs.len(),
            files.len(),
            cached.matrix.n_terms
        );
        self.install(cached.docs, cached.meta, Some(cached.vectorizer), Some(cached.matrix));
        Ok(())
    }

    fn install(
        &mut self,
        docs: Vec<String>,
        meta: Vec<PageRef>,
        vectorizer: Option<TfidfVectorizer>,
        matrix: Option<DocumentTermMatrix>,
    ) {
        self.pages = meta.iter().cloned().enumerate().map(|(i, r)| (r, i)).collect();
        self.docs = docs;
        self.meta = meta;
        self.model = match (vectorizer, matrix) {
            (Some(vectorizer), Some(matrix)) => Some(Model { vectorizer, matrix }),
            _ => None,
        };
    }

    /// Top-`k` pages for `query`, best first, each refined by the evidence resolver.
    ///
    /// Scores are cosine similarities; zero-score pages are still returned when
    /// fewer than `k` pages match.
    pub fn search(&self, query: &str, k: usize) -> Vec<PolicyHit> {
        let Some(model) = &self.model else {
            log::debug!("Search on empty policy index: {:?}", query);
            return Vec::new();
        };
        if model.matrix.is_empty() {
            return Vec::new();
        }

        let query_vec = model.vectorizer.transform(query);
        let sims = model.matrix.similarities(&query_vec);

        let mut order: Vec<usize> = (0..sims.len()).collect();
        // Stable: equal scores keep index order.
        order.sort_by(|&a, &b| sims[b].partial_cmp(&sims[a]).unwrap_or(std::cmp::Ordering::Equal));
        order.truncate(k);

        order
            .into_iter()
            .map(|i| {
                let origin = &self.meta[i];
                let evidence = self.resolve_evidence(&origin.file, origin.page, query);
                PolicyHit {
                    file: origin.file.clone(),
                    page: evidence.page,
                    score: sims[i],
                    snippet: normalize_text(&evidence.snippet),
                    orig_page: origin.page,
                }
            })
            .collect()
    }

    /// Distinct indexed file names, sorted.
    pub fn list_files(&self) -> Vec<String> {
        self.meta
            .iter()
            .map(|r| r.file.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Stored text of a page, if it was indexed.
    pub fn page_text(&self, file: &str, page: u32) -> Option<&str> {
        let key = PageRef {
            file: file.to_string(),
            page,
        };
        self.pages.get(&key).map(|&i| self.docs[i].as_str())
    }

    pub fn page_count(&self) -> usize {
        self.docs.len()
    }

    /// True when no search can return hits.
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
    }

    pub fn policy_dir(&self) -> &Path {
        &self.policy_dir
    }

    /// SHA-256 over the indexed (file, page, text) triples.
    ///
    /// Identical corpora give identical fingerprints, so a rebuild over
    /// unchanged documents can be checked for content stability.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (origin, text) in self.meta.iter().zip(&self.docs) {
            hasher.update(origin.file.as_bytes());
            hasher.update([0u8]);
            hasher.update(origin.page.to_le_bytes());
            hasher.update(text.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Debug for PolicyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyIndex")
            .field("policy_dir", &self.policy_dir)
            .field("pages", &self.docs.len())
            .field("fitted", &self.model.is_some())
            .finish()
    }
}
