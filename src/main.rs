use anyhow::Context;
use burndown::chart::PngChartRenderer;
use burndown::config::BurndownConfig;
use burndown::github::GitHubClient;
use burndown::{report, telemetry};
use chrono::Utc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    let config = BurndownConfig::from_env().context("invalid burndown configuration")?;
    telemetry::init(config.log_format);

    tracing::info!(
        repo_id = %config.github_repository,
        charts_dir = %config.charts_dir.display(),
        "Generating burndown charts"
    );

    let client = GitHubClient::new(config.github_token.clone(), &config.github_api_url)?;
    let renderer = PngChartRenderer::new(&config.charts_dir);

    let written =
        report::generate_charts(&client, &config.github_repository, &renderer, Utc::now()).await?;

    tracing::info!(charts = written.len(), "Done");
    Ok(())
}
