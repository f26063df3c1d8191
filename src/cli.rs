use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::policy::DEFAULT_TOP_K;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "riskmap",
    about = "riskmap - questionnaire-driven cyber risk scoring with policy evidence retrieval",
    version
)]
pub struct Args {
    /// Enable verbose logging of all operations
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score a profile against the catalog and print ranked risk views
    Assess(AssessArgs),
    /// Build (or load) the policy index and list the indexed documents
    Index(IndexArgs),
    /// Run a free-text query against the policy index
    Search(SearchArgs),
    /// Retrieve policy evidence for every ranked vulnerability
    Evidence(EvidenceArgs),
    /// Re-export an answer profile after import coercion
    ExportProfile(ExportProfileArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScoringArgs {
    /// Risk catalog (YAML)
    #[arg(short, long, default_value = "data/risk_catalog.yaml")]
    pub catalog: PathBuf,

    /// Answer profile (JSON key-value document)
    #[arg(short, long)]
    pub profile: PathBuf,

    /// Impact summary across a group of scenarios
    #[arg(short, long, default_value = "average")]
    pub mode: CalcMode,

    /// Likelihood weight in percent
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_likelihood: u32,

    /// Impact weight in percent
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_impact: u32,

    /// Vulnerability ids already remediated
    #[arg(long, value_delimiter = ',')]
    pub completed: Vec<String>,

    /// Fine-tuning overrides (JSON: {"assets": {...}, "threats": {...}})
    #[arg(long)]
    pub overrides: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AssessArgs {
    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Which ranked view to print
    #[arg(long, default_value = "vulnerabilities")]
    pub view: ViewKind,

    /// Emit the full assessment as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Write the JSON assessment to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct IndexArgs {
    /// Directory holding the policy PDFs
    #[arg(long, default_value = "policies")]
    pub policies: PathBuf,

    /// Drop cached artifacts and re-scan the directory
    #[arg(long)]
    pub rebuild: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long, default_value = "policies")]
    pub policies: PathBuf,

    /// Query text
    pub query: String,

    /// Number of hits
    #[arg(short, default_value_t = DEFAULT_TOP_K)]
    pub k: usize,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EvidenceArgs {
    #[command(flatten)]
    pub scoring: ScoringArgs,

    #[arg(long, default_value = "policies")]
    pub policies: PathBuf,

    /// Only the top N vulnerabilities
    #[arg(long)]
    pub limit: Option<usize>,

    /// Write the assessment with recommendations as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExportProfileArgs {
    /// Profile to import
    pub input: PathBuf,

    /// Destination (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// How impact is summarised across the scenarios of a group.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalcMode {
    /// Arithmetic mean of scenario impacts
    #[default]
    Average,
    /// Highest scenario impact
    Maximum,
}

impl std::fmt::Display for CalcMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcMode::Average => write!(f, "average"),
            CalcMode::Maximum => write!(f, "maximum"),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ViewKind {
    Vulnerabilities,
    Threats,
    Assets,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assess(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["riskmap", "assess", "--profile", "profile.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_weights_default_to_even_split() {
        let args = assess(&[]).unwrap();
        let Command::Assess(a) = args.command else {
            panic!("expected assess subcommand");
        };
        assert_eq!((a.scoring.weight_likelihood, a.scoring.weight_impact), (50, 50));
    }

    #[test]
    fn test_weights_are_bounded_percentages() {
        assert!(assess(&["--weight-likelihood", "100", "--weight-impact", "0"]).is_ok());
        assert!(assess(&["--weight-likelihood", "101"]).is_err());
        assert!(assess(&["--weight-impact", "4294967295"]).is_err());
    }
}
