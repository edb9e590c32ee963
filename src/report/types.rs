use crate::update::types::UpdateOutcome;

/// Result of processing one pull request.
#[derive(Debug, Clone)]
pub struct PrEntry {
    pub number: u64,
    /// Body contains a placeholder pattern; false when the PR could not be fetched
    pub needs_update: bool,
    pub work_hours: Option<f64>,
    pub work_hours_formatted: Option<String>,
    /// Outcome, or the error message if fetching or editing failed
    pub outcome: Result<UpdateOutcome, String>,
}

impl PrEntry {
    pub fn failed(number: u64, reason: String) -> Self {
        Self {
            number,
            needs_update: false,
            work_hours: None,
            work_hours_formatted: None,
            outcome: Err(reason),
        }
    }
}

/// Everything that happened in one repository.
#[derive(Debug, Clone)]
pub struct RepoReport {
    /// Repository in `owner/repo` form
    pub repo: String,
    /// Set when the pull request list itself could not be fetched
    pub list_error: Option<String>,
    pub entries: Vec<PrEntry>,
}

impl RepoReport {
    pub fn new(repo: &str) -> Self {
        Self {
            repo: repo.to_string(),
            list_error: None,
            entries: Vec::new(),
        }
    }

    pub fn list_failed(repo: &str, reason: String) -> Self {
        Self {
            list_error: Some(reason),
            ..Self::new(repo)
        }
    }
}

/// Counters printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pull requests created within the period
    pub total: usize,
    /// Of those, bodies still containing a placeholder
    pub needs_update: usize,
    /// Rewritten (or would be, under dry-run)
    pub updated: usize,
    /// Could not be fetched or edited
    pub failed: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[RepoReport]) -> Self {
        reports
            .iter()
            .flat_map(|report| &report.entries)
            .fold(RunSummary::default(), |mut summary, entry| {
                summary.total += 1;
                if entry.needs_update {
                    summary.needs_update += 1;
                }
                match &entry.outcome {
                    Ok(outcome) if outcome.is_update() => summary.updated += 1,
                    Ok(_) => {}
                    Err(_) => summary.failed += 1,
                }
                summary
            })
    }
}
