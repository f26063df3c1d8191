//! Scenario Generator
//!
//! Forms the (vulnerability, asset, threat) cross product allowed by the
//! catalog cross-references and scores every combination whose vulnerability
//! is still active for the given profile.

use crate::catalog::{Catalog, FineTuning};
use crate::errors::RiskResult;
use crate::models::{Scenario, Vulnerability};
use crate::profile::{ControlWeight, Profile};
use crate::scoring::{apply_modifiers, base_scores, risk_score};
use std::collections::BTreeSet;

/// Why a vulnerability produced no scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Marked remediated by the user; overrides the questionnaire
    Completed,
    /// Controlling field has no answer
    Unanswered,
    /// Controlling field answered "fully in place"
    Mitigated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Skip(SkipReason),
    /// Active; `None` for vulnerabilities without a control field
    Active(Option<ControlWeight>),
}

/// Decide whether a vulnerability is scored and with which control weight.
pub fn gate(vuln: &Vulnerability, profile: &Profile, completed: &BTreeSet<String>) -> Gate {
    if completed.contains(&vuln.id) {
        return Gate::Skip(SkipReason::Completed);
    }

    let Some(field) = vuln.control_field.as_deref() else {
        return Gate::Active(None);
    };

    match profile.control_weight(field) {
        None => Gate::Skip(SkipReason::Unanswered),
        Some(ControlWeight::Mitigated) => Gate::Skip(SkipReason::Mitigated),
        Some(weight) => Gate::Active(Some(weight)),
    }
}

/// Generate every active scenario, in catalog order (vulnerability, asset, threat).
pub fn generate_scenarios(
    catalog: &Catalog,
    profile: &Profile,
    overrides: &FineTuning,
    completed: &BTreeSet<String>,
) -> RiskResult<Vec<Scenario>> {
    let mut scenarios = Vec::new();

    for vuln in catalog.vulnerabilities() {
        let control_weight = match gate(vuln, profile, completed) {
            Gate::Active(weight) => weight,
            Gate::Skip(reason) => {
                log::debug!("Skipping vulnerability {}: {:?}", vuln.id, reason);
                continue;
            }
        };

        for asset in catalog.assets().iter().filter(|a| vuln.assets.contains(&a.id)) {
            for threat in catalog.threats().iter().filter(|t| vuln.threats.contains(&t.id)) {
                let base = base_scores(catalog, &asset.id, &threat.id, &vuln.id, overrides)?;
                let scores = apply_modifiers(&base, control_weight);

                scenarios.push(Scenario {
                    vuln_id: vuln.id.clone(),
                    vuln_name: vuln.name.clone(),
                    asset_id: asset.id.clone(),
                    asset_name: asset.name.clone(),
                    threat_id: threat.id.clone(),
                    threat_name: threat.name.clone(),
                    likelihood: scores.likelihood,
                    impact: scores.impact,
                    risk_score: risk_score(scores.likelihood, scores.impact),
                });
            }
        }
    }

    log::debug!("Generated {} scenarios", scenarios.len());
    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{tiny_catalog, SAMPLE_CATALOG};
    use crate::profile::Answer;

    fn answered(pairs: &[(&str, f64)]) -> Profile {
        Profile::from_answers(pairs.iter().map(|(k, v)| (*k, Answer::Number(*v))))
    }

    #[test]
    fn test_single_unmitigated_scenario() {
        let catalog = tiny_catalog();
        let profile = answered(&[("has_firewall", 1.0), ("has_training", 0.0)]);

        let scenarios =
            generate_scenarios(&catalog, &profile, &FineTuning::default(), &BTreeSet::new()).unwrap();
        let v1: Vec<_> = scenarios.iter().filter(|s| s.vuln_id == "V1").collect();

        assert_eq!(v1.len(), 1);
        assert_eq!(v1[0].likelihood, 4.0);
        assert_eq!(v1[0].impact, 4.0);
        assert_eq!(v1[0].risk_score, 16.0);
    }

    #[test]
    fn test_mitigated_vulnerability_never_appears() {
        let catalog = tiny_catalog();
        let profile = answered(&[("has_firewall", 0.0), ("has_training", 0.0)]);
        let scenarios =
            generate_scenarios(&catalog, &profile, &FineTuning::default(), &BTreeSet::new()).unwrap();
        assert!(scenarios.iter().all(|s| s.vuln_id != "V1" && s.vuln_id != "V2"));
    }

    #[test]
    fn test_unanswered_vulnerability_skipped() {
        let catalog = tiny_catalog();
        let vuln = catalog.vulnerability("V1").unwrap();
        assert_eq!(
            gate(vuln, &Profile::new(), &BTreeSet::new()),
            Gate::Skip(SkipReason::Unanswered)
        );
    }

    #[test]
    fn test_ungated_vulnerability_always_active() {
        let catalog = tiny_catalog();
        let scenarios =
            generate_scenarios(&catalog, &Profile::new(), &FineTuning::default(), &BTreeSet::new()).unwrap();

        // Only V3 lacks a control field; its modifiers are applied unscaled.
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].vuln_id, "V3");
        assert_eq!(scenarios[0].likelihood, 3.0);
        assert_eq!(scenarios[0].impact, 5.0);
    }

    #[test]
    fn test_completed_overrides_questionnaire() {
        let catalog = tiny_catalog();
        let profile = answered(&[("has_firewall", 1.0), ("has_training", 1.0)]);
        let completed: BTreeSet<String> = ["V1".to_string(), "V3".to_string()].into_iter().collect();

        let scenarios =
            generate_scenarios(&catalog, &profile, &FineTuning::default(), &completed).unwrap();
        assert!(scenarios.iter().all(|s| s.vuln_id == "V2"));
        assert_eq!(scenarios.len(), 4);
    }

    #[test]
    fn test_partial_answer_halves_scores() {
        let catalog = tiny_catalog();
        let full = generate_scenarios(
            &catalog,
            &answered(&[("has_firewall", 1.0)]),
            &FineTuning::default(),
            &BTreeSet::new(),
        )
        .unwrap();
        let partial = generate_scenarios(
            &catalog,
            &answered(&[("has_firewall", 0.5)]),
            &FineTuning::default(),
            &BTreeSet::new(),
        )
        .unwrap();

        let f = full.iter().find(|s| s.vuln_id == "V1").unwrap();
        let p = partial.iter().find(|s| s.vuln_id == "V1").unwrap();
        assert_eq!(p.likelihood, f.likelihood * 0.5);
        assert_eq!(p.impact, f.impact * 0.5);
    }

    #[test]
    fn test_scenarios_respect_cross_references() {
        let catalog = Catalog::from_yaml_str(SAMPLE_CATALOG).unwrap();
        let profile = Profile::from_answers(
            crate::profile::PROFILE_FIELDS
                .iter()
                .map(|f| (f.id, Answer::Number(1.0))),
        );
        let scenarios =
            generate_scenarios(&catalog, &profile, &FineTuning::default(), &BTreeSet::new()).unwrap();
        assert!(!scenarios.is_empty());

        for s in &scenarios {
            let vuln = catalog.vulnerability(&s.vuln_id).unwrap();
            assert!(vuln.assets.contains(&s.asset_id));
            assert!(vuln.threats.contains(&s.threat_id));
            assert!(s.risk_score > 0.0 && s.risk_score <= 25.0);
        }

        let expected: usize = catalog
            .vulnerabilities()
            .iter()
            .map(|v| v.assets.len() * v.threats.len())
            .sum();
        assert_eq!(scenarios.len(), expected);
    }
}
