//! Scoring Function
//!
//! Turns catalog base values plus vulnerability modifiers into a clamped
//! likelihood/impact pair and a risk score.

use crate::catalog::{Catalog, FineTuning};
use crate::errors::RiskResult;
use crate::profile::ControlWeight;

/// Lowest value a scored likelihood or impact may take. Keeps risk strictly positive.
pub const SCORE_MIN: f64 = 0.1;
/// Highest value on the catalog scale.
pub const SCORE_MAX: f64 = 5.0;

/// Base values for one scenario before modifiers are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseScores {
    pub likelihood: f64,
    pub impact: f64,
    pub likelihood_mod: f64,
    pub impact_mod: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifiedScores {
    pub likelihood: f64,
    pub impact: f64,
}

/// Read base likelihood/impact, preferring fine-tuning overrides over catalog values.
///
/// Unknown ids are a precondition violation and come back as
/// [`crate::RiskError::UnknownId`].
pub fn base_scores(
    catalog: &Catalog,
    asset_id: &str,
    threat_id: &str,
    vuln_id: &str,
    overrides: &FineTuning,
) -> RiskResult<BaseScores> {
    let asset = catalog.asset(asset_id)?;
    let threat = catalog.threat(threat_id)?;
    let vuln = catalog.vulnerability(vuln_id)?;

    Ok(BaseScores {
        likelihood: overrides.threat_likelihood(threat_id).unwrap_or(threat.likelihood),
        impact: overrides.asset_impact(asset_id).unwrap_or(asset.impact),
        likelihood_mod: vuln.likelihood_mod,
        impact_mod: vuln.impact_mod,
    })
}

/// Apply the vulnerability modifiers.
///
/// With a control weight the modifier is added first and the sum is scaled by
/// the residual exposure; ungated vulnerabilities (`None`) stay unscaled. Both
/// results are clamped to [`SCORE_MIN`, `SCORE_MAX`].
pub fn apply_modifiers(base: &BaseScores, control_weight: Option<ControlWeight>) -> ModifiedScores {
    let (likelihood, impact) = match control_weight {
        Some(weight) => {
            let w = weight.factor();
            (
                (base.likelihood + base.likelihood_mod) * w,
                (base.impact + base.impact_mod) * w,
            )
        }
        None => (
            base.likelihood + base.likelihood_mod,
            base.impact + base.impact_mod,
        ),
    };

    ModifiedScores {
        likelihood: clamp(likelihood, SCORE_MIN, SCORE_MAX),
        impact: clamp(impact, SCORE_MIN, SCORE_MAX),
    }
}

pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

pub fn risk_score(likelihood: f64, impact: f64) -> f64 {
    likelihood * impact
}
