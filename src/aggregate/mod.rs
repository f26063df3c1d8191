//! Aggregator
//!
//! Groups scored scenarios by vulnerability, threat or asset and produces a
//! ranked view per grouping. Views are rebuilt from scratch on every change of
//! scenarios, calculation mode or weighting; rows are never patched in place.

mod matrix;

pub use matrix::{band_counts, build_matrix, matrix_bucket, BandCounts, MatrixCell, MatrixEntry, RiskBand};

use crate::cli::CalcMode;
use crate::models::Scenario;
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Grouping key for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Vulnerability,
    Threat,
    Asset,
}

impl GroupBy {
    fn key<'a>(&self, s: &'a Scenario) -> (&'a str, &'a str) {
        match self {
            GroupBy::Vulnerability => (&s.vuln_id, &s.vuln_name),
            GroupBy::Threat => (&s.threat_id, &s.threat_name),
            GroupBy::Asset => (&s.asset_id, &s.asset_name),
        }
    }
}

/// User-configured likelihood/impact weighting in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weighting {
    pub likelihood_pct: u32,
    pub impact_pct: u32,
}

impl Default for Weighting {
    fn default() -> Self {
        Self {
            likelihood_pct: 50,
            impact_pct: 50,
        }
    }
}

impl Weighting {
    pub fn new(likelihood_pct: u32, impact_pct: u32) -> Self {
        Self {
            likelihood_pct,
            impact_pct,
        }
    }

    /// Weights scaled to sum to 1; an all-zero configuration falls back to 0.5/0.5.
    pub fn normalized(&self) -> (f64, f64) {
        let total = u64::from(self.likelihood_pct) + u64::from(self.impact_pct);
        if total == 0 {
            return (0.5, 0.5);
        }
        (
            self.likelihood_pct as f64 / total as f64,
            self.impact_pct as f64 / total as f64,
        )
    }
}

impl CalcMode {
    /// Display label for the impact column under this mode.
    pub fn impact_label(&self) -> &'static str {
        match self {
            CalcMode::Average => "Avg Impact",
            CalcMode::Maximum => "Max Impact",
        }
    }
}

/// Calculation mode after the critical-infrastructure policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDecision {
    pub mode: CalcMode,
    /// The selector is fixed and may not be changed by the user.
    pub locked: bool,
}

/// Operators of critical infrastructure are always assessed on maximum impact.
pub fn effective_mode(profile: &Profile, requested: CalcMode) -> ModeDecision {
    if profile.is_critical_infrastructure() {
        if requested != CalcMode::Maximum {
            log::info!("Critical infrastructure profile: forcing maximum calculation mode");
        }
        ModeDecision {
            mode: CalcMode::Maximum,
            locked: true,
        }
    } else {
        ModeDecision {
            mode: requested,
            locked: false,
        }
    }
}

/// Name paired with the scenario value it was seen with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

/// One ranked row of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    /// Display rank (1-based) after sorting; not an entity id.
    pub nr: usize,
    pub id: String,
    pub name: String,
    pub avg_likelihood: f64,
    /// Mean or maximum scenario impact, depending on the view's mode
    pub impact: f64,
    pub risk: f64,
    pub scenario_count: usize,
    /// Distinct counterpart names; the grouped dimension itself stays empty.
    pub vulnerabilities: Vec<String>,
    pub threats: Vec<String>,
    pub assets: Vec<String>,
    /// Distinct (threat, scenario likelihood) pairs
    pub threat_likelihoods: Vec<NamedValue>,
    /// Distinct (asset, scenario impact) pairs
    pub asset_impacts: Vec<NamedValue>,
}

impl RiskRow {
    pub fn band(&self) -> RiskBand {
        RiskBand::classify(self.impact, self.avg_likelihood)
    }
}

/// A ranked view for one grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskView {
    pub group_by: GroupBy,
    pub mode: CalcMode,
    pub weighting: Weighting,
    pub rows: Vec<RiskRow>,
}

impl RiskView {
    pub fn by_nr(&self, nr: usize) -> Option<&RiskRow> {
        self.rows.get(nr.checked_sub(1)?)
    }

    pub fn by_id(&self, id: &str) -> Option<&RiskRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn matrix(&self) -> Vec<MatrixCell> {
        build_matrix(&self.rows)
    }

    pub fn band_counts(&self) -> BandCounts {
        band_counts(&self.rows)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Round to two decimals, the precision every reported figure uses.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn push_distinct(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn push_distinct_pair(pairs: &mut Vec<NamedValue>, name: &str, value: f64) {
    if !pairs.iter().any(|p| p.name == name && p.value == value) {
        pairs.push(NamedValue {
            name: name.to_string(),
            value,
        });
    }
}

/// Build the ranked view for one grouping.
///
/// Groups appear in encounter order before sorting; the sort is stable so
/// equal risks keep that order.
pub fn aggregate(scenarios: &[Scenario], group_by: GroupBy, mode: CalcMode, weighting: Weighting) -> RiskView {
    let (w_likelihood, w_impact) = weighting.normalized();

    let mut order: Vec<Vec<&Scenario>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for scenario in scenarios {
        let (id, _) = group_by.key(scenario);
        let slot = *positions.entry(id).or_insert_with(|| {
            order.push(Vec::new());
            order.len() - 1
        });
        order[slot].push(scenario);
    }

    let mut rows: Vec<RiskRow> = order
        .into_iter()
        .map(|members| {
            let (id, name) = group_by.key(members[0]);
            let n = members.len() as f64;

            let avg_likelihood = members.iter().map(|s| s.likelihood).sum::<f64>() / n;
            let impact = match mode {
                CalcMode::Average => members.iter().map(|s| s.impact).sum::<f64>() / n,
                CalcMode::Maximum => members.iter().map(|s| s.impact).fold(f64::MIN, f64::max),
            };
            let risk = w_likelihood * avg_likelihood + w_impact * impact;

            let mut row = RiskRow {
                nr: 0,
                id: id.to_string(),
                name: name.to_string(),
                avg_likelihood: round2(avg_likelihood),
                impact: round2(impact),
                risk: round2(risk),
                scenario_count: members.len(),
                vulnerabilities: Vec::new(),
                threats: Vec::new(),
                assets: Vec::new(),
                threat_likelihoods: Vec::new(),
                asset_impacts: Vec::new(),
            };

            for s in &members {
                if group_by != GroupBy::Vulnerability {
                    push_distinct(&mut row.vulnerabilities, &s.vuln_name);
                }
                if group_by != GroupBy::Threat {
                    push_distinct(&mut row.threats, &s.threat_name);
                }
                if group_by != GroupBy::Asset {
                    push_distinct(&mut row.assets, &s.asset_name);
                }
                push_distinct_pair(&mut row.threat_likelihoods, &s.threat_name, s.likelihood);
                push_distinct_pair(&mut row.asset_impacts, &s.asset_name, s.impact);
            }

            row
        })
        .collect();

    rows.sort_by(|a, b| b.risk.partial_cmp(&a.risk).unwrap_or(Ordering::Equal));
    for (i, row) in rows.iter_mut().enumerate() {
        row.nr = i + 1;
    }

    RiskView {
        group_by,
        mode,
        weighting,
        rows,
    }
}

/// All three views over the same scenario set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskViews {
    pub vulnerabilities: RiskView,
    pub threats: RiskView,
    pub assets: RiskView,
}

pub fn aggregate_all(scenarios: &[Scenario], mode: CalcMode, weighting: Weighting) -> RiskViews {
    RiskViews {
        vulnerabilities: aggregate(scenarios, GroupBy::Vulnerability, mode, weighting),
        threats: aggregate(scenarios, GroupBy::Threat, mode, weighting),
        assets: aggregate(scenarios, GroupBy::Asset, mode, weighting),
    }
}
