//! Hit Filter
//!
//! Awareness and training pages match many queries through shared vocabulary.
//! They are only kept for vulnerabilities that are themselves about awareness.

use super::terms::{AWARENESS_HIT_KEYWORDS, AWARENESS_VULN_KEYWORDS};
use crate::models::PolicyHit;

/// Hits handed to the recommendation composer.
pub const MAX_EVIDENCE_HITS: usize = 3;

pub fn is_awareness_vulnerability(vuln_name: &str) -> bool {
    let lower = vuln_name.to_lowercase();
    AWARENESS_VULN_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn is_awareness_hit(hit: &PolicyHit) -> bool {
    let text = format!("{} {}", hit.snippet, hit.file).to_lowercase();
    AWARENESS_HIT_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Drop awareness noise and keep the first few hits.
///
/// Never empties a non-empty result: if every hit is discarded, the first
/// unfiltered hits are returned instead.
pub fn filter_hits(vuln_name: &str, hits: Vec<PolicyHit>) -> Vec<PolicyHit> {
    let awareness_vuln = is_awareness_vulnerability(vuln_name);

    let kept: Vec<PolicyHit> = hits
        .iter()
        .filter(|hit| {
            let noise = !awareness_vuln && is_awareness_hit(hit);
            if noise {
                log::debug!("Discarding awareness hit {} p.{} for '{}'", hit.file, hit.page, vuln_name);
            }
            !noise
        })
        .take(MAX_EVIDENCE_HITS)
        .cloned()
        .collect();

    if kept.is_empty() {
        hits.into_iter().take(MAX_EVIDENCE_HITS).collect()
    } else {
        kept
    }
}
