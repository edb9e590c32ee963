mod config;
mod hours;
mod pr;
mod report;
mod update;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

/// rewrite-pr-duration: fills the "actual time spent" line of GitHub pull
/// request bodies with the business hours between creation and merge/close.
#[derive(Parser, Debug)]
#[command(name = "rewrite-pr-duration", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Compute durations but do not edit any pull request
    #[arg(short, long)]
    dry_run: bool,

    /// Print every pull request, including skipped ones, and enable debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Also write the run summary as markdown to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::Config::load_from(&cli.config).map_err(|e| {
        eprintln!("Error: {e}");
        eprintln!(
            "\nHint: copy config.example.toml to {} and edit it",
            cli.config.display()
        );
        e
    })?;
    config.apply_overrides(cli.dry_run, cli.verbose);
    let config = config;

    init_tracing(config.options.verbose);
    debug!(
        config = %cli.config.display(),
        repos = config.repositories.targets.len(),
        holidays = config.holidays.len(),
        window = %config.work_hours,
        minutes_per_day = config.work_hours.minutes_per_day(),
        dry_run = config.options.dry_run,
        "loaded configuration"
    );

    report::print_header(&config);

    let client = pr::GhCli::new();
    let updater = update::Updater::new(&config, &client);

    let mut reports = Vec::with_capacity(config.repositories.targets.len());
    for repo in &config.repositories.targets {
        let repo_report = updater
            .process_repository(repo)
            .instrument(info_span!("repository", repo = %repo))
            .await;
        report::print_repository(&repo_report, config.options.verbose);
        reports.push(repo_report);
    }

    let summary = report::RunSummary::from_reports(&reports);
    info!(
        total = summary.total,
        needs_update = summary.needs_update,
        updated = summary.updated,
        failed = summary.failed,
        "done"
    );
    report::print_summary(&summary, config.options.dry_run);

    if let Some(path) = cli.output.as_deref() {
        report::write_markdown_summary(&reports, &summary, &config, path)?;
    }

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked from `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "rewrite_pr_duration=debug"
    } else {
        "rewrite_pr_duration=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
