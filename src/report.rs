use crate::chart::ChartRenderer;
use crate::config::RepoId;
use crate::counter;
use crate::github::{GitHubClient, GitHubIssue};
use crate::windows::{WindowSpec, WINDOWS};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Fetches the repository's issues once and renders every window from them.
///
/// This keeps the network side apart from counting and rendering, which
/// [`render_windows`] does on its own.
pub async fn generate_charts(
    client: &GitHubClient,
    repo_id: &RepoId,
    renderer: &dyn ChartRenderer,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    let issues = client.fetch_issues(repo_id).await?;
    render_windows(&issues, &WINDOWS, renderer, now)
}

/// Counts and renders each window in order. The first failure aborts the run.
pub fn render_windows(
    issues: &[GitHubIssue],
    windows: &[WindowSpec],
    renderer: &dyn ChartRenderer,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(windows.len());

    for spec in windows {
        let window = spec
            .resolve(now)
            .with_context(|| format!("window {} cannot be placed before {now}", spec.label))?;

        let counts = counter::daily_counts(issues, window.start, window.end);
        let path = renderer
            .render(&counts, spec.file_name, spec.title)
            .with_context(|| format!("failed to render the {} chart", spec.label))?;

        if let Some(latest) = counts.latest() {
            tracing::info!(
                window = spec.label,
                start = %window.start,
                end = %window.end,
                days = counts.len(),
                open = latest.open,
                closed = latest.closed,
                path = %path.display(),
                "Wrote burndown chart"
            );
        }

        written.push(path);
    }

    Ok(written)
}
