//! Application configuration.
//!
//! Everything is read from environment variables at startup; there is no
//! config file. The backing repository and token identify the GitHub repo
//! used as the document store.

use std::time::Duration;

/// Default location of the task tracker document inside the content repo.
pub const DEFAULT_TRACKER_PATH: &str = "00_PROJECT_MANAGEMENT/TASK_TRACKER.md";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address for the HTTP server.
    pub host: String,
    /// Bind port for the HTTP server.
    pub port: u16,
    /// GitHub API token used for all content store calls.
    pub github_token: String,
    /// Owner of the content repository.
    pub repo_owner: String,
    /// Name of the content repository.
    pub repo_name: String,
    /// Path of the task tracker document within the repository.
    pub tracker_path: String,
    /// Interval for background re-polling of cached documents.
    pub refresh_interval: Duration,
}

impl Config {
    /// Build a configuration from environment variables.
    ///
    /// - `PORTAL_HOST` / `PORTAL_PORT` - server bind address (default `0.0.0.0:3100`)
    /// - `GITHUB_TOKEN` - API token for the content repository
    /// - `PORTAL_REPO_OWNER` / `PORTAL_REPO_NAME` - the content repository
    /// - `PORTAL_TRACKER_PATH` - tracker document path within the repo
    /// - `PORTAL_REFRESH_SECS` - background refresh interval in seconds (default 30)
    pub fn from_env() -> Self {
        let github_token = std::env::var("GITHUB_TOKEN").unwrap_or_default();
        if github_token.is_empty() {
            tracing::warn!("GITHUB_TOKEN is not set; content store requests will be unauthenticated");
        }

        let refresh_secs = std::env::var("PORTAL_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Self {
            host: std::env::var("PORTAL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORTAL_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
            github_token,
            repo_owner: std::env::var("PORTAL_REPO_OWNER").unwrap_or_default(),
            repo_name: std::env::var("PORTAL_REPO_NAME").unwrap_or_default(),
            tracker_path: std::env::var("PORTAL_TRACKER_PATH")
                .unwrap_or_else(|_| DEFAULT_TRACKER_PATH.to_string()),
            refresh_interval: Duration::from_secs(refresh_secs.max(1)),
        }
    }

    /// The `owner/name` slug of the content repository.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3100,
            github_token: String::new(),
            repo_owner: String::new(),
            repo_name: String::new(),
            tracker_path: DEFAULT_TRACKER_PATH.to_string(),
            refresh_interval: Duration::from_secs(30),
        }
    }
}
