//! Configuration for both binaries, loaded from environment variables.
//!
//! `main` builds these structs once (after `.env` has been loaded) and hands
//! them to the components explicitly. Nothing below `main` reads the process
//! environment on its own.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default GitHub REST API root.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Directory charts are written to, relative to the working directory.
pub const DEFAULT_CHARTS_DIR: &str = "charts";

/// API Gateway endpoint reached through the private VPC endpoint.
pub const DEFAULT_API_ENDPOINT: &str =
    "https://vpce-xxxxx.execute-api.us-east-1.vpce.amazonaws.com/prod/your-endpoint";

/// Region used to sign requests for the endpoint above.
pub const DEFAULT_API_REGION: &str = "us-gov-west-1";

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = String;

    /// Parses the `owner/repo` form GitHub Actions exposes as `GITHUB_REPOSITORY`.
    /// Empty, `.` and `..` components are rejected since they would change the API route.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let is_valid = |part: &str| !part.is_empty() && part != "." && part != "..";
        match s.trim().split('/').map(str::trim).collect::<Vec<_>>().as_slice() {
            [owner, repo] if is_valid(owner) && is_valid(repo) => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(format!("expected repository in `owner/repo` form, got `{s}`")),
        }
    }
}

/// Output format of the log lines written to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings for the `burndown` binary.
#[derive(Clone, Debug, Deserialize)]
pub struct BurndownConfig {
    /// Repository whose issues are charted, as `owner/repo`.
    #[serde(deserialize_with = "deserialize_repo_id")]
    pub github_repository: RepoId,

    /// Token sent as a bearer credential. Public repositories work without one,
    /// at a much lower rate limit.
    pub github_token: Option<String>,

    /// Root of the GitHub REST API.
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Directory the PNG files are written to. Created if missing.
    #[serde(default = "default_charts_dir")]
    pub charts_dir: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl BurndownConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

/// Settings for the `invoke-api` binary.
///
/// AWS credentials are deliberately absent: they come from the SDK's default
/// provider chain.
#[derive(Clone, Debug, Deserialize)]
pub struct InvokerConfig {
    #[serde(default = "default_api_endpoint")]
    pub invoke_api_endpoint: String,

    #[serde(default = "default_api_region")]
    pub invoke_api_region: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl InvokerConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_charts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CHARTS_DIR)
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_api_region() -> String {
    DEFAULT_API_REGION.to_string()
}

fn deserialize_repo_id<'de, D>(deserializer: D) -> Result<RepoId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
