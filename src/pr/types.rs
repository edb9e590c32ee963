use serde::{Deserialize, Deserializer};

/// One row of `gh pr list --json number,createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrSummary {
    pub number: u64,
    /// UTC ISO-8601 timestamp
    pub created_at: String,
}

/// Fields of `gh pr view --json body,createdAt,mergedAt,closedAt,state`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrView {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub merged_at: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub state: String,
}

/// A pull request as seen by the updater, tagged with the repository it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Repository in `owner/repo` form
    pub repo: String,
    pub number: u64,
    /// OPEN, CLOSED or MERGED
    pub state: String,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    pub closed_at: Option<String>,
    pub body: String,
}

impl PullRequest {
    pub fn from_view(repo: &str, number: u64, view: PrView) -> Self {
        Self {
            repo: repo.to_string(),
            number,
            state: view.state,
            created_at: view.created_at,
            merged_at: view.merged_at,
            closed_at: view.closed_at,
            body: view.body,
        }
    }

    /// When the work ended: the merge time, else the close time.
    pub fn end_timestamp(&self) -> Option<&str> {
        self.merged_at.as_deref().or(self.closed_at.as_deref())
    }

    /// Short reference in the form `owner/repo#123`.
    pub fn short_ref(&self) -> String {
        format!("{}#{}", self.repo, self.number)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// gh reports an unset timestamp as either null or "".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
