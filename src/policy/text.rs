//! Keyword tokenization and snippet normalization shared by retrieval and
//! query building.

use crate::errors::{RiskError, RiskResult};
use regex::Regex;

/// Keyword token: letters (incl. German umlauts), digits and hyphens, at least 4 long.
pub const TOKEN_PATTERN: &str = r"[A-Za-zÄÖÜäöüß0-9\-]{4,}";

const SOFT_HYPHEN: char = '\u{00ad}';

#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    pub fn new() -> RiskResult<Self> {
        let pattern = Regex::new(TOKEN_PATTERN).map_err(|e| RiskError::regex(e, TOKEN_PATTERN))?;
        Ok(Self { pattern })
    }

    /// Every token in order of appearance, lowercased, duplicates kept.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.pattern
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Distinct tokens in first-seen order, at most `cap`.
    pub fn keywords(&self, text: &str, cap: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for token in self.tokens(text) {
            if !out.contains(&token) {
                out.push(token);
            }
        }
        out.truncate(cap);
        out
    }
}

/// Strip soft hyphens and collapse whitespace runs.
pub fn normalize_text(s: &str) -> String {
    s.replace(SOFT_HYPHEN, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hard cut after `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
