//! Assessment Session
//!
//! Per-user mutable state the engine reads from: answers, fine-tuning,
//! completed actions, weighting, calculation mode and memoized
//! recommendations. The caller owns the session and passes it in; nothing in
//! the engine keeps state of its own.

use crate::aggregate::{aggregate_all, effective_mode, ModeDecision, RiskRow, RiskViews, Weighting};
use crate::catalog::{Catalog, FineTuning};
use crate::cli::CalcMode;
use crate::errors::RiskResult;
use crate::models::{Recommendation, RiskContext, Scenario};
use crate::policy::PolicyIndex;
use crate::profile::Profile;
use crate::recommend::{recommend, QueryBuilder, RecommendationComposer};
use crate::scenario::generate_scenarios;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Memo key: (vulnerability name, first threat, first asset).
pub type RecommendationKey = (String, String, String);

/// Scored scenarios and their views for one recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub mode: ModeDecision,
    pub weighting: Weighting,
    pub scenarios: Vec<Scenario>,
    pub views: RiskViews,
}

#[derive(Debug, Default)]
pub struct Session {
    pub profile: Profile,
    pub fine_tuning: FineTuning,
    pub weighting: Weighting,
    completed: BTreeSet<String>,
    requested_mode: CalcMode,
    recommendations: HashMap<RecommendationKey, Recommendation>,
}

impl Session {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Replace the profile from an exported JSON document.
    ///
    /// Completed actions and memoized recommendations belong to the old
    /// profile and are dropped.
    pub fn import_profile(&mut self, raw: &str) -> RiskResult<()> {
        self.profile = Profile::import_json(raw)?;
        self.completed.clear();
        self.recommendations.clear();
        log::debug!("Session state reset after profile import");
        Ok(())
    }

    /// Request a calculation mode. Ignored (returns false) while the profile
    /// locks the mode.
    pub fn set_calc_mode(&mut self, mode: CalcMode) -> bool {
        if self.profile.is_critical_infrastructure() {
            log::debug!("Calculation mode is locked; ignoring request for {}", mode);
            return false;
        }
        self.requested_mode = mode;
        true
    }

    /// The mode the next assessment will use.
    pub fn calc_mode(&self) -> ModeDecision {
        effective_mode(&self.profile, self.requested_mode)
    }

    pub fn mark_completed(&mut self, vuln_id: impl Into<String>) {
        self.completed.insert(vuln_id.into());
    }

    pub fn unmark_completed(&mut self, vuln_id: &str) -> bool {
        self.completed.remove(vuln_id)
    }

    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    /// Generate and aggregate all scenarios for the current state.
    ///
    /// The critical-infrastructure check runs on every call. Once it forces
    /// maximum mode that mode sticks, even if the answer later changes.
    pub fn assess(&mut self, catalog: &Catalog) -> RiskResult<Assessment> {
        let mode = self.calc_mode();
        self.requested_mode = mode.mode;

        let scenarios = generate_scenarios(catalog, &self.profile, &self.fine_tuning, &self.completed)?;
        let views = aggregate_all(&scenarios, mode.mode, self.weighting);

        log::info!(
            "Assessed {} scenarios ({} vulnerabilities, mode {}{})",
            scenarios.len(),
            views.vulnerabilities.rows.len(),
            mode.mode,
            if mode.locked { ", locked" } else { "" }
        );

        Ok(Assessment {
            mode,
            weighting: self.weighting,
            scenarios,
            views,
        })
    }

    /// Recommendation for a vulnerability row, memoized for the session.
    ///
    /// The first listed threat and asset stand in for the whole group.
    pub fn recommendation(
        &mut self,
        row: &RiskRow,
        index: Option<&PolicyIndex>,
        builder: &QueryBuilder,
        composer: &dyn RecommendationComposer,
        k: usize,
    ) -> RiskResult<Recommendation> {
        let threat = row.threats.first().cloned().unwrap_or_default();
        let asset = row.assets.first().cloned().unwrap_or_default();
        let key = (row.name.clone(), threat.clone(), asset.clone());

        if let Some(cached) = self.recommendations.get(&key) {
            log::trace!("Recommendation cache hit for '{}'", row.name);
            return Ok(cached.clone());
        }

        let context = RiskContext {
            asset,
            threat,
            vuln: row.name.clone(),
            risk: row.risk,
            likelihood: row.avg_likelihood,
            impact: row.impact,
        };
        let recommendation = recommend(index, builder, composer, &context, k)?;
        self.recommendations.insert(key, recommendation.clone());
        Ok(recommendation)
    }

    pub fn cached_recommendations(&self) -> usize {
        self.recommendations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::tiny_catalog;
    use crate::policy::tests::{index_with, SAMPLE_POLICIES};
    use crate::policy::DEFAULT_TOP_K;
    use crate::profile::{Answer, CRITICAL_INFRASTRUCTURE_FIELD};
    use crate::recommend::tests::CountingComposer;

    fn session() -> Session {
        Session::new(Profile::from_answers([
            ("has_firewall", Answer::Number(1.0)),
            ("has_training", Answer::Number(0.5)),
        ]))
    }

    #[test]
    fn test_assess_is_idempotent() {
        let catalog = tiny_catalog();
        let mut session = session();
        let first = session.assess(&catalog).unwrap();
        let second = session.assess(&catalog).unwrap();
        assert_eq!(first, second);
        assert!(!first.views.vulnerabilities.is_empty());
    }

    #[test]
    fn test_completed_action_removes_vulnerability() {
        let catalog = tiny_catalog();
        let mut session = session();
        session.mark_completed("V1");

        let assessment = session.assess(&catalog).unwrap();
        assert!(assessment.views.vulnerabilities.by_id("V1").is_none());

        assert!(session.unmark_completed("V1"));
        let assessment = session.assess(&catalog).unwrap();
        assert!(assessment.views.vulnerabilities.by_id("V1").is_some());
    }

    #[test]
    fn test_critical_infrastructure_forces_and_keeps_maximum() {
        let catalog = tiny_catalog();
        let mut session = session();
        assert!(session.set_calc_mode(CalcMode::Average));

        session
            .profile
            .set(CRITICAL_INFRASTRUCTURE_FIELD, Answer::Number(0.0));
        let assessment = session.assess(&catalog).unwrap();
        assert_eq!(assessment.mode, ModeDecision { mode: CalcMode::Maximum, locked: true });
        assert!(!session.set_calc_mode(CalcMode::Average));

        // Answer withdrawn: selector unlocks, forced mode stays.
        session.profile.set(CRITICAL_INFRASTRUCTURE_FIELD, Answer::Number(1.0));
        let assessment = session.assess(&catalog).unwrap();
        assert_eq!(assessment.mode, ModeDecision { mode: CalcMode::Maximum, locked: false });
        assert!(session.set_calc_mode(CalcMode::Average));
        assert_eq!(session.calc_mode().mode, CalcMode::Average);
    }

    #[test]
    fn test_import_resets_session_state() {
        let mut session = session();
        session.mark_completed("V1");
        session
            .recommendations
            .insert(("a".into(), "b".into(), "c".into()), Recommendation::no_evidence());

        session.import_profile(r#"{"has_firewall": "nein"}"#).unwrap();

        assert!(session.completed().is_empty());
        assert_eq!(session.cached_recommendations(), 0);
        assert_eq!(session.profile.get_weight("has_firewall"), Some(1.0));
    }

    #[test]
    fn test_import_without_critical_answer_keeps_mode_selectable() {
        let mut session = Session::default();
        session.import_profile(r#"{"has_firewall": "nein"}"#).unwrap();

        assert!(!session.calc_mode().locked);
        assert!(session.set_calc_mode(CalcMode::Average));
        assert_eq!(session.calc_mode(), ModeDecision { mode: CalcMode::Average, locked: false });
    }

    #[test]
    fn test_recommendation_is_memoized() {
        let catalog = tiny_catalog();
        let (_dir, index) = index_with(SAMPLE_POLICIES);
        let builder = QueryBuilder::new().unwrap();
        let composer = CountingComposer::default();

        let mut session = session();
        let assessment = session.assess(&catalog).unwrap();
        let row = assessment.views.vulnerabilities.by_id("V1").unwrap();

        let first = session
            .recommendation(row, Some(&index), &builder, &composer, DEFAULT_TOP_K)
            .unwrap();
        let second = session
            .recommendation(row, Some(&index), &builder, &composer, DEFAULT_TOP_K)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(composer.calls.get(), 1);
        assert_eq!(session.cached_recommendations(), 1);
    }

    #[test]
    fn test_recommendation_without_index_degrades() {
        let catalog = tiny_catalog();
        let builder = QueryBuilder::new().unwrap();
        let composer = CountingComposer::default();

        let mut session = session();
        let assessment = session.assess(&catalog).unwrap();
        let row = &assessment.views.vulnerabilities.rows[0];

        let rec = session
            .recommendation(row, None, &builder, &composer, DEFAULT_TOP_K)
            .unwrap();
        assert_eq!(rec, Recommendation::no_evidence());
        assert_eq!(composer.calls.get(), 0);
    }
}
