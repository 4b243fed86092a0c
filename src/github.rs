use crate::config::RepoId;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Fixed page size for the issue listing endpoint.
pub const PAGE_SIZE: u8 = 100;

/// An issue as seen by the burndown counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubIssue {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Raw entry of the issue listing. GitHub returns pull requests from the same
/// endpoint; they are the entries carrying a `pull_request` key, whatever its value.
#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "pull_request", deserialize_with = "key_present")]
    is_pull_request: bool,
}

/// Only called when the key exists, so any value (including `null`) means present.
fn key_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer).map(|_| true)
}

impl IssuePayload {
    fn into_issue(self) -> Option<GitHubIssue> {
        if self.is_pull_request {
            return None;
        }
        Some(GitHubIssue {
            number: self.number,
            created_at: self.created_at,
            closed_at: self.closed_at,
        })
    }
}

#[derive(Debug, Serialize)]
struct ListParams {
    state: &'static str,
    per_page: u8,
    page: u32,
    sort: &'static str,
    direction: &'static str,
}

impl ListParams {
    fn page(page: u32) -> Self {
        Self {
            state: "all",
            per_page: PAGE_SIZE,
            page,
            sort: "created",
            direction: "asc",
        }
    }
}

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Builds a client against `api_url`, authenticating with `token` when given.
    ///
    /// Failed requests are never retried.
    pub fn new(token: Option<String>, api_url: &str) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .base_uri(api_url)
            .with_context(|| format!("invalid GitHub API url `{api_url}`"))?
            .add_retry_config(RetryConfig::None);
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        Ok(Self {
            octocrab: builder.build()?,
        })
    }

    /// Retrieves every issue of the repository, oldest first, excluding pull requests.
    ///
    /// Pages are requested one after another until GitHub answers with an empty
    /// page. Any failed page aborts the whole fetch.
    pub async fn fetch_issues(&self, repo_id: &RepoId) -> Result<Vec<GitHubIssue>> {
        let route = format!("/repos/{}/{}/issues", repo_id.owner, repo_id.repo);

        let mut issues = Vec::new();
        let mut page = 1;

        loop {
            let items: Vec<IssuePayload> = self
                .octocrab
                .get(&route, Some(&ListParams::page(page)))
                .await
                .with_context(|| format!("failed to fetch issues page {page} for {repo_id}"))?;

            if items.is_empty() {
                break;
            }

            let received = items.len();
            let before = issues.len();
            issues.extend(items.into_iter().filter_map(IssuePayload::into_issue));
            tracing::debug!(
                repo_id = %repo_id,
                page,
                received,
                kept = issues.len() - before,
                "Fetched issues page"
            );

            page += 1;
        }

        tracing::info!(repo_id = %repo_id, count = issues.len(), "Fetched issues");
        Ok(issues)
    }
}
