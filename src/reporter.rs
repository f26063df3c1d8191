//! Assessment output: a serialisable JSON report and styled terminal tables.

use crate::aggregate::{BandCounts, MatrixCell, RiskBand, RiskView};
use crate::errors::{RiskError, RiskResult};
use crate::models::Recommendation;
use crate::session::Assessment;
use chrono::{DateTime, Utc};
use console::style;
use serde::{Deserialize, Serialize};
use std::path::Path;

const NAME_COLUMN: usize = 44;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSummary {
    pub bands: BandCounts,
    pub matrix: Vec<MatrixCell>,
}

impl ViewSummary {
    fn of(view: &RiskView) -> Self {
        Self {
            bands: view.band_counts(),
            matrix: view.matrix(),
        }
    }
}

/// Recommendation attached to a vulnerability row in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowRecommendation {
    pub vuln_id: String,
    pub nr: usize,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub impact_label: String,
    pub assessment: Assessment,
    pub vulnerability_summary: ViewSummary,
    pub threat_summary: ViewSummary,
    pub asset_summary: ViewSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<RowRecommendation>,
}

impl AssessmentReport {
    pub fn new(assessment: Assessment) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            impact_label: assessment.mode.mode.impact_label().to_string(),
            vulnerability_summary: ViewSummary::of(&assessment.views.vulnerabilities),
            threat_summary: ViewSummary::of(&assessment.views.threats),
            asset_summary: ViewSummary::of(&assessment.views.assets),
            assessment,
            recommendations: Vec::new(),
        }
    }

    pub fn to_json(&self) -> RiskResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> RiskResult<()> {
        std::fs::write(path, self.to_json()?).map_err(|e| RiskError::io(e, path.to_path_buf()))?;
        log::info!("Assessment report written to {:?}", path);
        Ok(())
    }
}

fn truncate_middle(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        return s.to_string();
    }
    let half = max_len / 2;
    let start: String = s.chars().take(half).collect();
    let end: String = s.chars().skip(len - half).collect();
    format!("{}…{}", start, end)
}

fn band_label(band: RiskBand) -> String {
    let label = band.as_str().to_uppercase();
    match band {
        RiskBand::High => style(label).red().bold().to_string(),
        RiskBand::Medium => style(label).yellow().to_string(),
        RiskBand::Low => style(label).green().to_string(),
    }
}

/// Ranked table for one view.
pub fn render_view(title: &str, view: &RiskView) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style(title).bold().underlined()));

    if view.is_empty() {
        out.push_str("  (no active scenarios)\n");
        return out;
    }

    out.push_str(&format!(
        "  {:>3}  {:<width$}  {:>10}  {:>10}  {:>6}  {}\n",
        "Nr",
        "Name",
        "Likelihood",
        view.mode.impact_label(),
        "Risk",
        "Band",
        width = NAME_COLUMN
    ));
    for row in &view.rows {
        out.push_str(&format!(
            "  {:>3}  {:<width$}  {:>10.2}  {:>10.2}  {:>6.2}  {}\n",
            row.nr,
            truncate_middle(&row.name, NAME_COLUMN),
            row.avg_likelihood,
            row.impact,
            row.risk,
            band_label(row.band()),
            width = NAME_COLUMN
        ));
    }

    let bands = view.band_counts();
    out.push_str(&format!(
        "  {} high, {} medium, {} low\n",
        bands.high, bands.medium, bands.low
    ));
    out
}

/// Matrix cells that hold more than one row, as `impact/likelihood: Nr list`.
pub fn render_shared_cells(view: &RiskView) -> String {
    view.matrix()
        .iter()
        .filter(|cell| cell.members.len() > 1)
        .map(|cell| {
            let nrs: Vec<String> = cell.members.iter().map(|m| m.nr.to_string()).collect();
            format!("  I {:.1} / L {:.1}: #{}\n", cell.impact, cell.likelihood, nrs.join(", #"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::tiny_catalog;
    use crate::profile::{Answer, Profile};
    use crate::session::Session;

    fn assessment() -> Assessment {
        let mut session = Session::new(Profile::from_answers([
            ("has_firewall", Answer::Number(1.0)),
            ("has_training", Answer::Number(1.0)),
        ]));
        session.assess(&tiny_catalog()).unwrap()
    }

    #[test]
    fn test_truncate_middle() {
        assert_eq!(truncate_middle("kurz", 10), "kurz");
        assert_eq!(truncate_middle("abcdefghij", 4), "ab…ij");
    }

    #[test]
    fn test_report_json_contains_views() {
        let report = AssessmentReport::new(assessment());
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["generated_at"].is_string());
        assert_eq!(value["impact_label"], "Avg Impact");
        assert_eq!(value["assessment"]["mode"]["mode"], "average");
        assert!(value["assessment"]["views"]["vulnerabilities"]["rows"].is_array());
        assert!(value.get("recommendations").is_none());
    }

    #[test]
    fn test_render_view_lists_every_row() {
        let assessment = assessment();
        let table = render_view("Vulnerabilities", &assessment.views.vulnerabilities);
        for row in &assessment.views.vulnerabilities.rows {
            assert!(table.contains(&row.name));
        }
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        AssessmentReport::new(assessment()).write(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("vulnerability_summary"));
    }
}
