//! 5×5 risk-matrix placement and banding

use super::RiskRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const AXIS_MIN: f64 = 1.0;
const AXIS_MAX: f64 = 5.0;

/// Round to the nearest 0.5 (`floor(x*2 + 0.5) / 2`) and clamp to the matrix axis.
pub fn matrix_bucket(x: f64) -> f64 {
    ((x * 2.0 + 0.5).floor() / 2.0).clamp(AXIS_MIN, AXIS_MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub nr: usize,
    pub name: String,
}

/// All rows that land on the same (impact, likelihood) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub impact: f64,
    pub likelihood: f64,
    pub members: Vec<MatrixEntry>,
}

/// Place rows on the matrix, merging rows that share a cell. Display only.
pub fn build_matrix(rows: &[RiskRow]) -> Vec<MatrixCell> {
    // Buckets are multiples of 0.5, so doubling gives exact integer keys.
    let mut cells: BTreeMap<(u8, u8), MatrixCell> = BTreeMap::new();

    for row in rows {
        let impact = matrix_bucket(row.impact);
        let likelihood = matrix_bucket(row.avg_likelihood);
        let key = ((impact * 2.0) as u8, (likelihood * 2.0) as u8);

        cells
            .entry(key)
            .or_insert_with(|| MatrixCell {
                impact,
                likelihood,
                members: Vec::new(),
            })
            .members
            .push(MatrixEntry {
                nr: row.nr,
                name: row.name.clone(),
            });
    }

    cells.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Classify on the matrix score (impact × likelihood).
    pub fn classify(impact: f64, likelihood: f64) -> Self {
        let score = impact * likelihood;
        if score >= 20.0 {
            RiskBand::High
        } else if score >= 12.0 {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn band_counts(rows: &[RiskRow]) -> BandCounts {
    let mut counts = BandCounts::default();
    for row in rows {
        match RiskBand::classify(row.impact, row.avg_likelihood) {
            RiskBand::High => counts.high += 1,
            RiskBand::Medium => counts.medium += 1,
            RiskBand::Low => counts.low += 1,
        }
    }
    counts
}
