//! Evidence-backed recommendations
//!
//! Turns a risk row into a policy query, retrieves and filters evidence, and
//! hands it to a [`RecommendationComposer`]. Composing prose is the composer's
//! job; this module only decides what evidence it sees.

pub mod filter;
pub mod query;
pub mod terms;

use crate::errors::RiskResult;
use crate::models::{PolicyHit, Recommendation, RiskContext};
use crate::policy::text::truncate_chars;
use crate::policy::PolicyIndex;

pub use filter::{filter_hits, is_awareness_vulnerability, MAX_EVIDENCE_HITS};
pub use query::QueryBuilder;

/// External collaborator that writes a recommendation from evidence.
///
/// Implementations may be slow (e.g. a remote language model); callers memoize
/// results per scenario key.
pub trait RecommendationComposer {
    fn compose(&self, hits: &[PolicyHit], context: &RiskContext) -> RiskResult<Recommendation>;
}

/// Lists the evidence as-is, best hit first. Needs no external service.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceDigestComposer {
    pub excerpt_chars: usize,
}

impl Default for EvidenceDigestComposer {
    fn default() -> Self {
        Self { excerpt_chars: 240 }
    }
}

impl RecommendationComposer for EvidenceDigestComposer {
    fn compose(&self, hits: &[PolicyHit], context: &RiskContext) -> RiskResult<Recommendation> {
        let mut lines = vec![format!(
            "Address '{}' ({} / {}), risk {:.2}. Relevant policy passages:",
            context.vuln, context.threat, context.asset, context.risk
        )];
        for hit in hits {
            lines.push(format!(
                "- {} p.{} (score {:.3}): {}",
                hit.file,
                hit.page,
                hit.score,
                truncate_chars(&hit.snippet, self.excerpt_chars)
            ));
        }

        Ok(Recommendation {
            text: lines.join("\n"),
            main_source: hits.first().cloned(),
        })
    }
}

/// Search the index for a scenario and filter the hits.
///
/// A missing index yields no hits; retrieval never fails the caller.
pub fn enrich_with_policies(
    index: Option<&PolicyIndex>,
    builder: &QueryBuilder,
    threat_name: &str,
    vuln_name: &str,
    asset_name: &str,
    k: usize,
) -> Vec<PolicyHit> {
    let Some(index) = index else {
        log::debug!("No policy index available for '{}'", vuln_name);
        return Vec::new();
    };

    let query = builder.build_query(threat_name, vuln_name, asset_name);
    log::debug!("Policy query for '{}': {}", vuln_name, query);

    filter_hits(vuln_name, index.search(&query, k))
}

/// Retrieve evidence and compose, short-circuiting when there is none.
pub fn recommend(
    index: Option<&PolicyIndex>,
    builder: &QueryBuilder,
    composer: &dyn RecommendationComposer,
    context: &RiskContext,
    k: usize,
) -> RiskResult<Recommendation> {
    let hits = enrich_with_policies(index, builder, &context.threat, &context.vuln, &context.asset, k);
    if hits.is_empty() {
        return Ok(Recommendation::no_evidence());
    }
    composer.compose(&hits, context)
}
