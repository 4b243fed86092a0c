//! Issue burndown charts and a SigV4-signed API Gateway invoker.
//!
//! The `burndown` binary pages through a repository's issues, tallies how many
//! were open and closed at the end of each day, and renders one PNG per
//! lookback window. The `invoke-api` binary sends a single signed GET request
//! and prints the response.

pub mod chart;
pub mod config;
pub mod counter;
pub mod github;
pub mod invoker;
pub mod report;
pub mod telemetry;
pub mod windows;
