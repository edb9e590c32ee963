pub mod placeholder;
pub mod types;

pub use types::{PrSummary, PrView, PullRequest};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::hours::TimestampError;

/// Upper bound passed to `gh pr list --limit`.
pub const LIST_LIMIT: u32 = 1000;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to parse gh output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// Access to pull request data and mutation.
///
/// Implementations must be Send + Sync so a single client can be shared by
/// every repository the updater visits.
#[async_trait]
pub trait PrClient: Send + Sync {
    /// Every pull request of `repo`, in any state.
    async fn list(&self, repo: &str) -> Result<Vec<PrSummary>, PrError>;

    /// Body, timestamps and state of one pull request.
    async fn view(&self, repo: &str, number: u64) -> Result<PullRequest, PrError>;

    /// Replace the body of one pull request.
    async fn edit_body(&self, repo: &str, number: u64, body: &str) -> Result<(), PrError>;
}

/// `PrClient` backed by the GitHub CLI. Authentication is whatever `gh` is logged in with.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
}

impl Default for GhCli {
    fn default() -> Self {
        Self {
            program: "gh".to_string(),
        }
    }
}

impl GhCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run gh with `args` and return its stdout.
    async fn run(&self, args: &[&str]) -> Result<String, PrError> {
        debug!(program = %self.program, ?args, "running external command");
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| PrError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let subcommand: Vec<&str> = args.iter().take(2).copied().collect();
            return Err(PrError::CommandFailed {
                command: format!("{} {}", self.program, subcommand.join(" ")),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, PrError> {
        let stdout = self.run(args).await?;
        Ok(serde_json::from_str(&stdout)?)
    }
}

#[async_trait]
impl PrClient for GhCli {
    #[instrument(skip(self))]
    async fn list(&self, repo: &str) -> Result<Vec<PrSummary>, PrError> {
        let limit = LIST_LIMIT.to_string();
        let rows: Vec<PrSummary> = self
            .run_json(&[
                "pr", "list", "--repo", repo, "--state", "all", "--limit", limit.as_str(), "--json",
                "number,createdAt",
            ])
            .await?;
        debug!(count = rows.len(), "listed pull requests");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn view(&self, repo: &str, number: u64) -> Result<PullRequest, PrError> {
        let number_arg = number.to_string();
        let view: PrView = self
            .run_json(&[
                "pr",
                "view",
                number_arg.as_str(),
                "--repo",
                repo,
                "--json",
                "body,createdAt,mergedAt,closedAt,state",
            ])
            .await?;
        debug!(state = %view.state, body_len = view.body.len(), "fetched pull request");
        Ok(PullRequest::from_view(repo, number, view))
    }

    #[instrument(skip(self, body), fields(body_len = body.len()))]
    async fn edit_body(&self, repo: &str, number: u64, body: &str) -> Result<(), PrError> {
        let number_arg = number.to_string();
        self.run(&["pr", "edit", number_arg.as_str(), "--repo", repo, "--body", body])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(program: &str) -> GhCli {
        GhCli {
            program: program.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let client = client_with("gh-binary-that-does-not-exist");
        let err = client.list("org/repo").await.unwrap_err();
        assert!(matches!(err, PrError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_command_failed() {
        let client = client_with("false");
        let err = client.view("org/repo", 1).await.unwrap_err();
        match err {
            PrError::CommandFailed { command, .. } => assert_eq!(command, "false pr view"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unparseable_output_is_json_error() {
        // `echo` prints its arguments, which is not JSON
        let client = client_with("echo");
        let err = client.list("org/repo").await.unwrap_err();
        assert!(matches!(err, PrError::Json(_)));
    }

    #[test]
    fn test_timestamp_error_converts() {
        let err: PrError = crate::hours::normalize_to_local("nope").unwrap_err().into();
        assert!(err.to_string().contains("nope"));
    }
}
