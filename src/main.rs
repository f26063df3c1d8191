use clap::Parser;
use env_logger::Env;
use riskmap::aggregate::Weighting;
use riskmap::catalog::{Catalog, FineTuning};
use riskmap::cli::{
    Args, AssessArgs, CalcMode, Command, EvidenceArgs, ExportProfileArgs, IndexArgs, ScoringArgs, SearchArgs, ViewKind,
};
use riskmap::errors::{RiskError, RiskResult};
use riskmap::policy::{PolicyIndex, DEFAULT_TOP_K};
use riskmap::profile::Profile;
use riskmap::recommend::{EvidenceDigestComposer, QueryBuilder};
use riskmap::reporter::{render_shared_cells, render_view, AssessmentReport, RowRecommendation};
use riskmap::session::Session;
use riskmap::ui;
use std::path::Path;

fn read_to_string(path: &Path) -> RiskResult<String> {
    std::fs::read_to_string(path).map_err(|e| RiskError::io(e, path.to_path_buf()))
}

fn write_or_print(output: Option<&Path>, content: &str) -> RiskResult<()> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(|e| RiskError::io(e, path.to_path_buf())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

/// Catalog plus a session configured from the scoring flags.
fn load_session(args: &ScoringArgs) -> RiskResult<(Catalog, Session)> {
    let catalog = Catalog::load(&args.catalog)?;

    let mut session = Session::default();
    session.import_profile(&read_to_string(&args.profile)?)?;

    if let Some(path) = &args.overrides {
        session.fine_tuning = FineTuning::load(path, &catalog)?;
        log::info!(
            "Loaded fine-tuning: {} asset and {} threat overrides",
            session.fine_tuning.assets.len(),
            session.fine_tuning.threats.len()
        );
    }

    session.weighting = Weighting::new(args.weight_likelihood, args.weight_impact);
    if !session.set_calc_mode(args.mode) && args.mode != CalcMode::Maximum {
        log::warn!("Critical infrastructure profile: --mode {} ignored, using maximum", args.mode);
    }
    for id in &args.completed {
        catalog.vulnerability(id)?;
        session.mark_completed(id.clone());
    }

    Ok((catalog, session))
}

fn open_index(policies: &Path, rebuild: bool, quiet: bool) -> RiskResult<PolicyIndex> {
    let spinner = ui::index_spinner(quiet);
    let index = if rebuild {
        spinner.set_message("rebuilding policy index");
        PolicyIndex::open_rebuilt(policies)?
    } else {
        PolicyIndex::open(policies)?
    };
    ui::finish_spinner(&spinner, index.page_count(), index.list_files().len());
    Ok(index)
}

fn run_assess(args: &AssessArgs) -> RiskResult<()> {
    let (catalog, mut session) = load_session(&args.scoring)?;
    let assessment = session.assess(&catalog)?;

    if args.json || args.output.is_some() {
        let report = AssessmentReport::new(assessment);
        return match &args.output {
            Some(path) => report.write(path),
            None => write_or_print(None, &report.to_json()?),
        };
    }

    let (title, view) = match args.view {
        ViewKind::Vulnerabilities => ("Vulnerabilities", &assessment.views.vulnerabilities),
        ViewKind::Threats => ("Threats", &assessment.views.threats),
        ViewKind::Assets => ("Assets", &assessment.views.assets),
    };
    println!("{}", render_view(title, view));

    let shared = render_shared_cells(view);
    if !shared.is_empty() {
        println!("Shared matrix cells:\n{}", shared);
    }

    ui::headline("Assessment completed");
    ui::detail("Scenarios", assessment.scenarios.len(), false);
    ui::detail(
        "Mode",
        format!("{}{}", assessment.mode.mode, if assessment.mode.locked { " (locked)" } else { "" }),
        false,
    );
    let (wl, wi) = assessment.weighting.normalized();
    ui::detail("Weighting", format!("{:.0}% likelihood / {:.0}% impact", wl * 100.0, wi * 100.0), true);
    Ok(())
}

fn run_index(args: &IndexArgs, quiet: bool) -> RiskResult<()> {
    let index = open_index(&args.policies, args.rebuild, quiet)?;

    for file in index.list_files() {
        println!("  {}", file);
    }
    ui::headline("Policy index ready");
    ui::detail("Documents", index.list_files().len(), false);
    ui::detail("Pages", index.page_count(), false);
    ui::detail("Fingerprint", index.fingerprint(), true);
    Ok(())
}

fn run_search(args: &SearchArgs, quiet: bool) -> RiskResult<()> {
    let index = open_index(&args.policies, false, quiet)?;
    let hits = index.search(&args.query, args.k);

    if hits.is_empty() {
        println!("No matching policy pages.");
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>2}. {} p.{} (orig p.{}) score {:.4}\n    {}",
            rank + 1,
            hit.file,
            hit.page,
            hit.orig_page,
            hit.score,
            hit.snippet
        );
    }
    Ok(())
}

fn run_evidence(args: &EvidenceArgs, quiet: bool) -> RiskResult<()> {
    let (catalog, mut session) = load_session(&args.scoring)?;
    let assessment = session.assess(&catalog)?;

    // Scoring never depends on the index; a broken policy directory only
    // costs the evidence.
    let index = match open_index(&args.policies, false, quiet) {
        Ok(index) => Some(index),
        Err(e) => {
            log::warn!("Policy index unavailable: {}", e);
            None
        }
    };

    let builder = QueryBuilder::new()?;
    let composer = EvidenceDigestComposer::default();
    let limit = args.limit.unwrap_or(usize::MAX);

    let mut report = AssessmentReport::new(assessment.clone());
    for row in assessment.views.vulnerabilities.rows.iter().take(limit) {
        let recommendation = session.recommendation(row, index.as_ref(), &builder, &composer, DEFAULT_TOP_K)?;
        println!("#{} {} (risk {:.2})\n{}\n", row.nr, row.name, row.risk, recommendation.text);
        report.recommendations.push(RowRecommendation {
            vuln_id: row.id.clone(),
            nr: row.nr,
            recommendation,
        });
    }

    if let Some(path) = &args.output {
        report.write(path)?;
    }

    ui::headline("Evidence retrieval completed");
    ui::detail("Vulnerabilities", report.recommendations.len(), false);
    ui::detail(
        "With evidence",
        report
            .recommendations
            .iter()
            .filter(|r| r.recommendation.main_source.is_some())
            .count(),
        true,
    );
    Ok(())
}

fn run_export_profile(args: &ExportProfileArgs) -> RiskResult<()> {
    let profile = Profile::import_json(&read_to_string(&args.input)?)?;
    write_or_print(args.output.as_deref(), &profile.export_json()?)
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize logging based on verbosity and quiet flags
    let log_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    log::debug!("riskmap starting with args: {:?}", args);

    match &args.command {
        Command::Assess(a) => run_assess(a)?,
        Command::Index(a) => run_index(a, args.quiet)?,
        Command::Search(a) => run_search(a, args.quiet)?,
        Command::Evidence(a) => run_evidence(a, args.quiet)?,
        Command::ExportProfile(a) => run_export_profile(a)?,
    }

    Ok(())
}
