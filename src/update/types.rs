use crate::pr::PullRequest;

/// A fetched pull request together with its computed work duration.
#[derive(Debug, Clone)]
pub struct PrInfo {
    pub pr: PullRequest,
    /// Business hours between creation and merge/close; None while still open
    pub work_hours: Option<f64>,
    /// `work_hours` rendered for the body, e.g. `1時間30分`
    pub work_hours_formatted: Option<String>,
    /// Body contains one of the configured placeholder patterns
    pub needs_update: bool,
}

/// What `Updater::apply` did with one pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Body rewritten through the client
    Updated,
    /// Body would have been rewritten, but dry-run is on
    DryRun,
    /// Placeholder present but no duration line matched; body left alone
    Unchanged,
    /// No placeholder, or no duration to write yet
    Skipped,
}

impl UpdateOutcome {
    /// Counts towards the "updated" total of a run.
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateOutcome::Updated | UpdateOutcome::DryRun)
    }
}

impl std::fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateOutcome::Updated => write!(f, "updated"),
            UpdateOutcome::DryRun => write!(f, "dry-run"),
            UpdateOutcome::Unchanged => write!(f, "unchanged"),
            UpdateOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_counts_as_update() {
        assert!(UpdateOutcome::Updated.is_update());
        assert!(UpdateOutcome::DryRun.is_update());
        assert!(!UpdateOutcome::Unchanged.is_update());
        assert!(!UpdateOutcome::Skipped.is_update());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(UpdateOutcome::DryRun.to_string(), "dry-run");
        assert_eq!(UpdateOutcome::Skipped.to_string(), "skipped");
    }
}
