//! Query Builder
//!
//! The vulnerability name is the primary signal; threat and asset names add at
//! most two terms each.

use super::terms::{KEYWORD_BUNDLES, SYNONYM_GROUPS};
use crate::errors::RiskResult;
use crate::policy::text::Tokenizer;

/// Terms kept per extracted text.
pub const MAX_TEXT_TERMS: usize = 20;
/// Terms kept in the final query.
pub const MAX_QUERY_TERMS: usize = 12;
/// Terms contributed by each of the threat and asset names.
pub const SECONDARY_TERMS: usize = 2;

fn push_unique(out: &mut Vec<String>, term: &str) {
    if !out.iter().any(|t| t == term) {
        out.push(term.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    tokenizer: Tokenizer,
}

impl QueryBuilder {
    pub fn new() -> RiskResult<Self> {
        Ok(Self {
            tokenizer: Tokenizer::new()?,
        })
    }

    /// Tokens of `text` followed by their synonym expansions, first-seen order.
    pub fn extract_terms(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        for token in self.tokenizer.tokens(text) {
            push_unique(&mut terms, &token);
            for group in SYNONYM_GROUPS.iter().filter(|g| token.contains(g.key)) {
                for synonym in group.terms {
                    push_unique(&mut terms, synonym);
                }
            }
        }
        terms.truncate(MAX_TEXT_TERMS);
        terms
    }

    /// Space-joined retrieval query for one scenario.
    pub fn build_query(&self, threat_name: &str, vuln_name: &str, asset_name: &str) -> String {
        let mut parts = self.extract_terms(vuln_name);

        let vuln_lower = vuln_name.to_lowercase();
        for bundle in KEYWORD_BUNDLES {
            if bundle.triggers.iter().any(|t| vuln_lower.contains(t)) {
                log::trace!("Query for '{}' adds {} bundle", vuln_name, bundle.name);
                parts.extend(bundle.terms.iter().map(|t| t.to_string()));
            }
        }

        parts.extend(self.extract_terms(threat_name).into_iter().take(SECONDARY_TERMS));
        parts.extend(self.extract_terms(asset_name).into_iter().take(SECONDARY_TERMS));

        let mut query: Vec<String> = Vec::new();
        for part in &parts {
            push_unique(&mut query, part);
        }
        query.truncate(MAX_QUERY_TERMS);
        query.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> QueryBuilder {
        QueryBuilder::new().unwrap()
    }

    #[test]
    fn test_extract_terms_expands_synonyms() {
        let terms = builder().extract_terms("Keine MFA-Pflicht");
        assert_eq!(terms[0], "keine");
        assert_eq!(terms[1], "mfa-pflicht");
        assert!(terms.contains(&"2fa".to_string()));
        assert!(terms.contains(&"multi factor".to_string()));
    }

    #[test]
    fn test_extract_terms_caps_and_dedups() {
        let terms = builder().extract_terms("backup backup cloud-backup firewall passwordmanager patchstand");
        assert_eq!(terms.len(), MAX_TEXT_TERMS);
        let backups = terms.iter().filter(|t| *t == "backup").count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_build_query_applies_bundle() {
        let query = builder().build_query("Ransomware", "Fehlendes Patchmanagement", "Server");
        assert_eq!(
            query,
            "fehlendes patchmanagement patch update vulnerability management security update ransomware server"
        );
    }

    #[test]
    fn test_build_query_term_cap() {
        let b = builder();
        let query = b.build_query(
            "Diebstahl von Zugangsdaten",
            "Schwache Passwort-Richtlinie ohne MFA Backup Cloud",
            "Kundendatenbank",
        );
        let mut expected = b.extract_terms("Schwache Passwort-Richtlinie ohne MFA Backup Cloud");
        expected.truncate(MAX_QUERY_TERMS);
        assert_eq!(query, expected.join(" "));
    }

    #[test]
    fn test_secondary_terms_limited_to_two() {
        let query = builder().build_query("Stromausfall durch Unwetter", "Alte", "Rechenzentrum Frankfurt Main");
        assert_eq!(query, "alte stromausfall durch rechenzentrum frankfurt");
    }
}
