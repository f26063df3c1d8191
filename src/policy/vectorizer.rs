//! Character n-gram TF-IDF
//!
//! N-grams are taken inside word boundaries: every whitespace-separated word is
//! padded with one space on each side and sliced into n-grams of each length in
//! the configured range. Words shorter than an n-gram length contribute the
//! padded word once. Weighting uses smoothed idf (`ln((1+n)/(1+df)) + 1`) and
//! rows are L2-normalized, so a dot product is a cosine similarity.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const NGRAM_MIN: usize = 3;
pub const NGRAM_MAX: usize = 5;
/// N-grams present in more than this share of pages are dropped.
pub const MAX_DOC_FREQ: f64 = 0.95;

/// Sparse row, indices strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f64>,
}

impl SparseVector {
    fn from_weights(mut entries: Vec<(u32, f64)>) -> Self {
        entries.sort_by_key(|(idx, _)| *idx);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }
        Self {
            indices: entries.iter().map(|(i, _)| *i).collect(),
            values: entries.iter().map(|(_, w)| *w).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// One row per indexed page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTermMatrix {
    pub n_terms: usize,
    pub rows: Vec<SparseVector>,
}

impl DocumentTermMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row is well-formed and addresses a term inside `n_terms`.
    pub fn is_consistent(&self) -> bool {
        self.rows.iter().all(|row| {
            row.indices.len() == row.values.len() && row.indices.iter().all(|&idx| (idx as usize) < self.n_terms)
        })
    }

    /// Linear kernel between the query and every row.
    pub fn similarities(&self, query: &SparseVector) -> Vec<f64> {
        self.rows.iter().map(|row| row.dot(query)).collect()
    }
}

/// Character n-grams within word boundaries.
pub fn char_wb_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut ngrams = Vec::new();

    for word in lower.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        let len = padded.len();

        for n in min_n..=max_n {
            if len <= n {
                ngrams.push(padded.iter().collect());
                break;
            }
            for start in 0..=(len - n) {
                ngrams.push(padded[start..start + n].iter().collect());
            }
        }
    }

    ngrams
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub ngram_range: (usize, usize),
    pub max_df: f64,
    vocabulary: BTreeMap<String, u32>,
    idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(NGRAM_MIN, NGRAM_MAX, MAX_DOC_FREQ)
    }
}

impl TfidfVectorizer {
    pub fn new(min_n: usize, max_n: usize, max_df: f64) -> Self {
        Self {
            ngram_range: (min_n, max_n),
            max_df,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    /// A vectorizer whose vocabulary survived fitting.
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// One idf weight per term, indices `0..len` each used once, and a usable
    /// n-gram range. Deserialized state is checked before weighing with it.
    pub fn is_consistent(&self) -> bool {
        let n = self.vocabulary.len();
        let (min_n, max_n) = self.ngram_range;
        let indices: BTreeSet<u32> = self.vocabulary.values().copied().collect();

        min_n >= 1
            && min_n <= max_n
            && self.idf.len() == n
            && indices.len() == n
            && indices.iter().all(|&idx| (idx as usize) < n)
            && self.idf.iter().all(|w| w.is_finite())
    }

    fn counts(&self, text: &str) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for gram in char_wb_ngrams(text, self.ngram_range.0, self.ngram_range.1) {
            *counts.entry(gram).or_insert(0) += 1;
        }
        counts
    }

    /// Learn vocabulary and idf from `docs`, returning their weighted rows.
    ///
    /// Vocabulary indices follow lexical order so the fitted state does not
    /// depend on hash iteration order.
    pub fn fit_transform(&mut self, docs: &[String]) -> DocumentTermMatrix {
        let doc_counts: Vec<HashMap<String, u32>> = docs.iter().map(|d| self.counts(d)).collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in &doc_counts {
            for gram in counts.keys() {
                *doc_freq.entry(gram.as_str()).or_insert(0) += 1;
            }
        }

        let n_docs = docs.len() as f64;
        let max_doc_count = self.max_df * n_docs;
        let kept: BTreeSet<&str> = doc_freq
            .iter()
            .filter(|(_, &df)| df as f64 <= max_doc_count)
            .map(|(gram, _)| *gram)
            .collect();

        log::debug!(
            "Vectorizer: {} distinct n-grams, {} kept after max_df={}",
            doc_freq.len(),
            kept.len(),
            self.max_df
        );

        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(i, gram)| (gram.to_string(), i as u32))
            .collect();
        self.idf = kept
            .iter()
            .map(|gram| ((1.0 + n_docs) / (1.0 + doc_freq[gram] as f64)).ln() + 1.0)
            .collect();

        let rows = doc_counts.iter().map(|counts| self.weigh(counts)).collect();

        DocumentTermMatrix {
            n_terms: self.vocabulary.len(),
            rows,
        }
    }

    fn weigh(&self, counts: &HashMap<String, u32>) -> SparseVector {
        let entries = counts
            .iter()
            .filter_map(|(gram, &count)| {
                self.vocabulary
                    .get(gram)
                    .map(|&idx| (idx, count as f64 * self.idf[idx as usize]))
            })
            .collect();
        SparseVector::from_weights(entries)
    }

    /// Vectorize text with the fitted vocabulary; unknown n-grams are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&self.counts(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "Backups werden täglich erstellt und offsite gelagert".to_string(),
            "Alle Konten nutzen Multi-Faktor-Authentifizierung".to_string(),
            "Die Firewall blockiert eingehende Verbindungen".to_string(),
            String::new(),
        ]
    }

    #[test]
    fn test_char_wb_ngrams() {
        let grams = char_wb_ngrams("Ab cde", 3, 5);
        // " ab " -> 3-grams " ab", "ab "; 4-gram " ab "; then stops (len 4 <= 5)
        // " cde " -> " cd", "cde", "de ", " cde", "cde ", " cde "
        assert_eq!(
            grams,
            vec![" ab", "ab ", " ab ", " cd", "cde", "de ", " cde", "cde ", " cde "]
        );
    }

    #[test]
    fn test_short_word_counted_once() {
        let grams = char_wb_ngrams("a", 3, 5);
        assert_eq!(grams, vec![" a "]);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&corpus());
        assert!(vectorizer.is_fitted());
        assert_eq!(matrix.len(), 4);

        for row in &matrix.rows[..3] {
            let norm: f64 = row.values.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        assert!(matrix.rows[3].is_empty());
    }

    #[test]
    fn test_query_matches_relevant_row() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&corpus());
        let sims = matrix.similarities(&vectorizer.transform("firewall netzwerk"));
        let best = (0..sims.len())
            .max_by(|&a, &b| sims[a].partial_cmp(&sims[b]).unwrap())
            .unwrap();
        assert_eq!(best, 2);
    }

    #[test]
    fn test_max_df_drops_ubiquitous_ngrams() {
        let docs = vec![
            "gemeinsam alpha".to_string(),
            "gemeinsam bravo".to_string(),
            "gemeinsam charlie".to_string(),
        ];
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit_transform(&docs);
        let query = vectorizer.transform("gemeinsam");
        assert!(query.is_empty());
    }

    #[test]
    fn test_single_document_prunes_everything() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&["nur ein dokument".to_string()]);
        assert!(!vectorizer.is_fitted());
        assert_eq!(matrix.n_terms, 0);
    }

    #[test]
    fn test_fitted_state_is_consistent() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&corpus());
        assert!(vectorizer.is_consistent());
        assert!(matrix.is_consistent());

        let mut short_idf = vectorizer.clone();
        short_idf.idf.pop();
        assert!(!short_idf.is_consistent());

        let mut out_of_range = vectorizer.clone();
        if let Some(idx) = out_of_range.vocabulary.values_mut().next() {
            *idx = u32::MAX;
        }
        assert!(!out_of_range.is_consistent());

        let mut bad_row = matrix.clone();
        bad_row.rows[0].indices[0] = bad_row.n_terms as u32;
        assert!(!bad_row.is_consistent());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let mut a = TfidfVectorizer::default();
        let mut b = TfidfVectorizer::default();
        let ma = a.fit_transform(&corpus());
        let mb = b.fit_transform(&corpus());
        assert_eq!(a, b);
        assert_eq!(ma, mb);
    }
}
