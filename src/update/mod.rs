pub mod types;

pub use types::{PrInfo, UpdateOutcome};

use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::hours::{calculate_duration, format_duration, normalize_to_local};
use crate::pr::placeholder::{has_placeholder, replace_placeholder};
use crate::pr::{PrClient, PrError};
use crate::report::types::{PrEntry, RepoReport};

/// Fills in the work duration of pull requests, one repository at a time.
///
/// Borrows the configuration read-only; the dry-run flag must already be
/// final when the updater is built.
pub struct Updater<'a, C: PrClient> {
    config: &'a Config,
    client: &'a C,
}

impl<'a, C: PrClient> Updater<'a, C> {
    pub fn new(config: &'a Config, client: &'a C) -> Self {
        Self { config, client }
    }

    /// Numbers of the pull requests in `repo` whose local creation date lies in the period.
    ///
    /// Rows with an unreadable timestamp are logged and left out.
    #[instrument(skip(self))]
    pub async fn pull_requests_in_period(&self, repo: &str) -> Result<Vec<u64>, PrError> {
        let rows = self.client.list(repo).await?;
        let listed = rows.len();

        let numbers: Vec<u64> = rows
            .into_iter()
            .filter_map(|row| match normalize_to_local(&row.created_at) {
                Ok(created) => self
                    .config
                    .period
                    .contains(created.date())
                    .then_some(row.number),
                Err(e) => {
                    warn!(pr = row.number, error = %e, "skipping row with bad createdAt");
                    None
                }
            })
            .collect();

        debug!(listed, selected = numbers.len(), "filtered pull requests by period");
        Ok(numbers)
    }

    /// Fetch one pull request and compute its duration.
    #[instrument(skip(self))]
    pub async fn inspect(&self, repo: &str, number: u64) -> Result<PrInfo, PrError> {
        let pr = self.client.view(repo, number).await?;
        let needs_update = has_placeholder(&pr.body, &self.config.placeholders.patterns);

        let work_hours = match (pr.created_at.as_deref(), pr.end_timestamp()) {
            (Some(created), Some(ended)) => Some(calculate_duration(
                normalize_to_local(created)?,
                normalize_to_local(ended)?,
                &self.config.work_hours,
                &self.config.holidays,
            )),
            _ => None,
        };
        let work_hours_formatted = work_hours.map(format_duration);
        debug!(needs_update, ?work_hours, state = %pr.state, "inspected pull request");

        Ok(PrInfo {
            pr,
            work_hours,
            work_hours_formatted,
            needs_update,
        })
    }

    /// Write the duration into the body, unless there is nothing to do or dry-run is on.
    #[instrument(skip(self, info), fields(pr = %info.pr.short_ref()))]
    pub async fn apply(&self, info: &PrInfo) -> Result<UpdateOutcome, PrError> {
        let formatted = match info.work_hours_formatted.as_deref() {
            Some(formatted) if info.needs_update => formatted,
            _ => return Ok(UpdateOutcome::Skipped),
        };

        let new_body = replace_placeholder(&info.pr.body, formatted);
        if new_body == info.pr.body {
            debug!("placeholder present but no duration line matched");
            return Ok(UpdateOutcome::Unchanged);
        }

        if self.config.options.dry_run {
            info!(duration = formatted, "dry run: would update body");
            return Ok(UpdateOutcome::DryRun);
        }

        self.client
            .edit_body(&info.pr.repo, info.pr.number, &new_body)
            .await?;
        info!(duration = formatted, "updated body");
        Ok(UpdateOutcome::Updated)
    }

    /// Select, inspect and apply every pull request of `repo`.
    ///
    /// Failures are recorded on the report; they never stop the remaining items.
    pub async fn process_repository(&self, repo: &str) -> RepoReport {
        info!("processing repository");
        let numbers = match self.pull_requests_in_period(repo).await {
            Ok(numbers) => numbers,
            Err(e) => {
                warn!(repo, error = %e, "failed to list pull requests");
                return RepoReport::list_failed(repo, e.to_string());
            }
        };

        let mut report = RepoReport::new(repo);
        for number in numbers {
            report.entries.push(self.process_one(repo, number).await);
        }
        report
    }

    async fn process_one(&self, repo: &str, number: u64) -> PrEntry {
        let info = match self.inspect(repo, number).await {
            Ok(info) => info,
            Err(e) => {
                warn!(repo, pr = number, error = %e, "failed to fetch pull request");
                return PrEntry::failed(number, e.to_string());
            }
        };

        let outcome = self.apply(&info).await.map_err(|e| {
            warn!(repo, pr = number, error = %e, "failed to update pull request");
            e.to_string()
        });

        PrEntry {
            number,
            needs_update: info.needs_update,
            work_hours: info.work_hours,
            work_hours_formatted: info.work_hours_formatted,
            outcome,
        }
    }
}
