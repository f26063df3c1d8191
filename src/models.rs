use serde::{Deserialize, Serialize};

/// Organisational resource with a base impact on the 1-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub impact: f64,
}

/// Adverse event with a base likelihood on the 1-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub id: String,
    pub name: String,
    pub likelihood: f64,
}

/// Weakness linking applicable assets and threats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
    #[serde(default)]
    pub likelihood_mod: f64,
    #[serde(default)]
    pub impact_mod: f64,
    /// Legacy list of profile fields; superseded by `control_field`.
    #[serde(default)]
    pub controls: Vec<String>,
    /// Profile field whose answer gates this vulnerability. `None` means ungated.
    #[serde(default)]
    pub control_field: Option<String>,
}

/// One scored (vulnerability, asset, threat) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub vuln_id: String,
    pub vuln_name: String,
    pub asset_id: String,
    pub asset_name: String,
    pub threat_id: String,
    pub threat_name: String,
    pub likelihood: f64,
    pub impact: f64,
    pub risk_score: f64,
}

/// Ranked retrieval result from the policy index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyHit {
    pub file: String,
    /// Page after neighbour refinement (1-based).
    pub page: u32,
    pub score: f64,
    pub snippet: String,
    /// Page the similarity search originally returned.
    pub orig_page: u32,
}

/// Context handed to the recommendation composer alongside the evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContext {
    pub asset: String,
    pub threat: String,
    pub vuln: String,
    pub risk: f64,
    pub likelihood: f64,
    pub impact: f64,
}

/// Composer output: free text plus the hit it considers the main source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub main_source: Option<PolicyHit>,
}

impl Recommendation {
    pub const NO_EVIDENCE_TEXT: &'static str = "No relevant policy documents found.";

    /// Result used when retrieval produced nothing to justify an action.
    pub fn no_evidence() -> Self {
        Self {
            text: Self::NO_EVIDENCE_TEXT.to_string(),
            main_source: None,
        }
    }
}
