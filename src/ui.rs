use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &[&str] = &["▰▱▱▱▱▱▱", "▰▰▱▱▱▱▱", "▰▰▰▱▱▱▱", "▰▰▰▰▱▱▱", "▰▰▰▰▰▱▱", "▰▰▰▰▰▰▱", "▰▰▰▰▰▰▰", "▱▰▰▰▰▰▰"];

/// Spinner shown while the policy index loads or builds. Hidden when quiet.
pub fn index_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner_style = ProgressStyle::with_template("{prefix} {spinner:.green} [{elapsed_precise}] {msg}")
        .map(|s| s.tick_strings(TICKS))
        .unwrap_or_else(|e| {
            log::warn!("Invalid spinner template: {}", e);
            ProgressStyle::default_spinner()
        });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style);
    spinner.set_prefix(style("POLICIES").cyan().bold().to_string());
    spinner.set_message("loading policy index");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

pub fn finish_spinner(spinner: &ProgressBar, pages: usize, files: usize) {
    spinner.finish_with_message(format!("{} pages from {} documents", pages, files));
}

/// `▶ title ✓` completion line.
pub fn headline(title: &str) {
    println!("    {} {} {}", style("▶").green(), style(title).white().bold(), style("✓").green());
}

pub fn detail(label: &str, value: impl std::fmt::Display, last: bool) {
    let branch = if last { "└─" } else { "├─" };
    println!("    {} {}: {}", style(branch).dim(), label, style(value).white().bold());
}
