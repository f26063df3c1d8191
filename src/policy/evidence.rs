//! Evidence Resolver
//!
//! Similarity search works on whole pages, but the relevant sentence often sits
//! on a neighbouring page. The resolver checks the hit page and its neighbours
//! for the query keywords and returns a normalized, bounded snippet.

use super::text::{normalize_text, truncate_chars};
use super::PolicyIndex;

/// Snippet length cap, in characters.
pub const SNIPPET_MAX_CHARS: usize = 900;
/// Keywords taken from the query for neighbour matching.
pub const MAX_QUERY_KEYWORDS: usize = 10;

/// Page chosen for a hit, with its snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    pub page: u32,
    pub snippet: String,
}

impl PolicyIndex {
    /// Pick the best page among `page`, `page - 1` and `page + 1` of `file`.
    ///
    /// The first non-empty candidate containing any query keyword wins. Without
    /// keywords the first non-empty candidate wins. Falls back to the original
    /// page, whose snippet may be empty.
    pub fn resolve_evidence(&self, file: &str, page: u32, query: &str) -> Evidence {
        let keywords = self.tokenizer.keywords(query, MAX_QUERY_KEYWORDS);

        let mut candidates = vec![page];
        if page > 1 {
            candidates.push(page - 1);
        }
        candidates.push(page + 1);

        for candidate in candidates {
            let Some(text) = self.page_text(file, candidate) else {
                continue;
            };
            let text = normalize_text(text);
            if text.is_empty() {
                continue;
            }

            let lower = text.to_lowercase();
            if keywords.is_empty() || keywords.iter().any(|k| lower.contains(k.as_str())) {
                if candidate != page {
                    log::trace!("Evidence for {} moved from page {} to {}", file, page, candidate);
                }
                return Evidence {
                    page: candidate,
                    snippet: truncate_chars(&text, SNIPPET_MAX_CHARS),
                };
            }
        }

        let fallback = self.page_text(file, page).map(normalize_text).unwrap_or_default();
        Evidence {
            page,
            snippet: truncate_chars(&fallback, SNIPPET_MAX_CHARS),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::policy::tests::index_with;

    #[test]
    fn test_keyword_on_hit_page_keeps_page() {
        let (_dir, index) = index_with(&[(
            "handbuch.pdf",
            &[
                "Allgemeine Einleitung zum Sicherheitshandbuch der Firma.",
                "Datensicherung: Backups werden täglich offsite gespeichert.",
                "Kapitel zu Passwortregeln und Kontoverwaltung im Detail.",
            ],
        )]);

        let evidence = index.resolve_evidence("handbuch.pdf", 2, "backup offsite");
        assert_eq!(evidence.page, 2);
        assert!(evidence.snippet.starts_with("Datensicherung"));
    }

    #[test]
    fn test_keyword_on_previous_page_moves_evidence() {
        let (_dir, index) = index_with(&[(
            "handbuch.pdf",
            &[
                "Allgemeine Einleitung zum Sicherheitshandbuch der Firma.",
                "Datensicherung: Backups werden täglich offsite gespeichert.",
                "Kapitel zu Passwortregeln und Kontoverwaltung im Detail.",
            ],
        )]);

        let evidence = index.resolve_evidence("handbuch.pdf", 3, "backup");
        assert_eq!(evidence.page, 2);
    }

    #[test]
    fn test_previous_page_wins_over_next_page() {
        let (_dir, index) = index_with(&[(
            "netz.pdf",
            &[
                "Die Firewall blockiert eingehende Verbindungen standardmäßig.",
                "Allgemeine Hinweise zur Dokumentenlenkung und Freigabe.",
                "Firewall-Regeln werden quartalsweise überprüft und freigegeben.",
                "Anhang mit Glossar und Abkürzungsverzeichnis der Richtlinie.",
            ],
        )]);

        let evidence = index.resolve_evidence("netz.pdf", 2, "firewall");
        assert_eq!(evidence.page, 1);
        assert!(evidence.snippet.starts_with("Die Firewall"));
    }

    #[test]
    fn test_next_page_used_when_only_it_matches() {
        let (_dir, index) = index_with(&[(
            "netz.pdf",
            &[
                "Allgemeine Einleitung zum Sicherheitshandbuch der Firma.",
                "Allgemeine Hinweise zur Dokumentenlenkung und Freigabe.",
                "Firewall-Regeln werden quartalsweise überprüft und freigegeben.",
                "Anhang mit Glossar und Abkürzungsverzeichnis der Richtlinie.",
            ],
        )]);

        let evidence = index.resolve_evidence("netz.pdf", 2, "firewall");
        assert_eq!(evidence.page, 3);
        assert!(evidence.snippet.starts_with("Firewall-Regeln"));
    }

    #[test]
    fn test_empty_hit_page_without_keywords_uses_neighbour() {
        let (_dir, index) = index_with(&[(
            "handbuch.pdf",
            &[
                "Allgemeine Einleitung zum Sicherheitshandbuch der Firma.",
                "kurz",
                "Kapitel zu Passwortregeln und Kontoverwaltung im Detail.",
            ],
        )]);

        // "mfa" is shorter than four characters, so there are no keywords.
        let evidence = index.resolve_evidence("handbuch.pdf", 2, "mfa");
        assert_eq!(evidence.page, 1);
    }

    #[test]
    fn test_no_match_falls_back_to_original_page() {
        let (_dir, index) = index_with(&[(
            "handbuch.pdf",
            &[
                "Allgemeine Einleitung zum Sicherheitshandbuch der Firma.",
                "Datensicherung: Backups werden täglich offsite gespeichert.",
                "Kapitel zu Passwortregeln und Kontoverwaltung im Detail.",
            ],
        )]);

        let evidence = index.resolve_evidence("handbuch.pdf", 2, "verschlüsselung");
        assert_eq!(evidence.page, 2);
        assert!(evidence.snippet.contains("Backups"));
    }

    #[test]
    fn test_snippet_is_normalized_and_bounded() {
        let long = format!("Sicher\u{00ad}heit   {}", "wort ".repeat(400));
        let (_dir, index) = index_with(&[(
            "lang.pdf",
            &[
                long.as_str(),
                "Zweite Seite mit anderem ausreichend langem Inhalt.",
                "Dritte Seite mit wiederum anderem langem Inhalt hier.",
            ],
        )]);

        let evidence = index.resolve_evidence("lang.pdf", 1, "sicherheit");
        assert_eq!(evidence.page, 1);
        assert!(evidence.snippet.starts_with("Sicherheit wort"));
        assert_eq!(evidence.snippet.chars().count(), super::SNIPPET_MAX_CHARS);
    }
}
