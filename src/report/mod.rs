pub mod types;

pub use types::{RepoReport, RunSummary};

use crate::config::Config;
use crate::update::UpdateOutcome;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use types::PrEntry;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

const RULE_WIDTH: usize = 80;

/// Banner printed before any repository is processed.
pub fn print_header(config: &Config) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", "GitHub PR work duration updater".bold());
    println!("{}", "=".repeat(RULE_WIDTH));
    println!();

    if config.options.dry_run {
        println!("{}", "[DRY-RUN] pull requests will not be modified".yellow().bold());
        println!();
    }

    println!(
        "Period: {} ~ {}",
        config.period.start_date, config.period.end_date
    );
    println!("Work hours: {}", config.work_hours);
    println!("Repositories: {}", config.repositories.targets.len());
    println!();
}

/// Per-repository block. Skipped and unchanged pull requests are only shown when verbose.
pub fn print_repository(report: &RepoReport, verbose: bool) {
    println!("Processing: {}", report.repo.bold());
    println!("{}", "-".repeat(RULE_WIDTH));

    if let Some(reason) = &report.list_error {
        println!("  {} {}", "✗ failed to list pull requests:".red(), reason);
        println!();
        return;
    }

    if report.entries.is_empty() {
        println!("  No pull requests in period");
        println!();
        return;
    }

    println!("  Pull requests in period: {}", report.entries.len());
    for entry in &report.entries {
        if let Some(line) = entry_line(entry, verbose) {
            println!("{line}");
        }
    }
    println!();
}

fn entry_line(entry: &PrEntry, verbose: bool) -> Option<String> {
    let duration = entry.work_hours_formatted.as_deref().unwrap_or("N/A");
    match &entry.outcome {
        Ok(UpdateOutcome::Updated) => Some(format!(
            "  {} PR #{}: updated to {}",
            "✓".green().bold(),
            entry.number,
            duration
        )),
        Ok(UpdateOutcome::DryRun) => Some(format!(
            "  {} PR #{}: would update to {}",
            "[DRY-RUN]".yellow(),
            entry.number,
            duration
        )),
        Ok(UpdateOutcome::Unchanged) if verbose => Some(format!(
            "  PR #{}: placeholder found but no duration line matched ({})",
            entry.number, duration
        )),
        Ok(UpdateOutcome::Skipped) if verbose && entry.needs_update => Some(format!(
            "  PR #{}: not merged or closed yet (skipped)",
            entry.number
        )),
        Ok(UpdateOutcome::Skipped) if verbose => {
            Some(format!("  PR #{}: no placeholder (skipped)", entry.number))
        }
        Ok(_) => None,
        Err(reason) => Some(format!(
            "  {} PR #{}: {}",
            "✗".red().bold(),
            entry.number,
            reason
        )),
    }
}

/// Final counters, plus a reminder when nothing was actually written.
pub fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", "Done".bold());
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Pull requests in period: {}", summary.total);
    println!("Needing update: {}", summary.needs_update);
    println!("Updated: {}", summary.updated.to_string().green());
    let failed = summary.failed.to_string();
    if summary.failed > 0 {
        println!("Failed: {}", failed.red());
    } else {
        println!("Failed: {failed}");
    }
    println!();

    if dry_run {
        println!("{}", "[DRY-RUN] no pull request was modified".yellow().bold());
        println!("Check the output above, then run again without --dry-run");
    }
}

/// Write the run as a markdown file.
///
/// # Run summary
/// **Period:** 2025-10-01 ~ 2025-12-31 | **Work hours:** 09:30-18:30 | **Dry run:** no
///
/// ## org/repo
/// | PR | Hours | Duration | Result |
/// |----|-------|----------|--------|
/// | #12 | 1.50 | 1時間30分 | updated |
#[instrument(skip(reports, summary, config), fields(repos = reports.len()))]
pub fn write_markdown_summary(
    reports: &[RepoReport],
    summary: &RunSummary,
    config: &Config,
    path: &Path,
) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str("# Run summary\n\n");
    md.push_str(&format!(
        "**Period:** {} ~ {} | **Work hours:** {} | **Dry run:** {}\n\n",
        config.period.start_date,
        config.period.end_date,
        config.work_hours,
        if config.options.dry_run { "yes" } else { "no" }
    ));
    md.push_str(&format!(
        "- Pull requests in period: {}\n- Needing update: {}\n- Updated: {}\n- Failed: {}\n\n",
        summary.total, summary.needs_update, summary.updated, summary.failed
    ));

    for report in reports {
        md.push_str(&format!("## {}\n\n", report.repo));
        if let Some(reason) = &report.list_error {
            md.push_str(&format!("Failed to list pull requests: `{reason}`\n\n"));
            continue;
        }
        if report.entries.is_empty() {
            md.push_str("No pull requests in period.\n\n");
            continue;
        }

        md.push_str("| PR | Hours | Duration | Result |\n|----|-------|----------|--------|\n");
        for entry in &report.entries {
            let result = match &entry.outcome {
                Ok(outcome) => outcome.to_string(),
                Err(reason) => format!("failed: {}", reason.replace('|', "\\|")),
            };
            let hours = entry
                .work_hours
                .map(|h| format!("{h:.2}"))
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| #{} | {} | {} | {} |\n",
                entry.number,
                hours,
                entry.work_hours_formatted.as_deref().unwrap_or("-"),
                result
            ));
        }
        md.push('\n');
    }

    debug!(path = %path.display(), bytes = md.len(), "writing markdown summary");
    std::fs::write(path, md)?;
    Ok(())
}
