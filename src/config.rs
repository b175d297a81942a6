use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::credentials::Credentials;
use crate::error::{AppError, Result};
use crate::platform::types::split_repo;
use crate::poller::PollerSettings;
use crate::report::NotificationConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub github: GitHubConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Deserialize, Clone)]
pub struct GitHubConfig {
    /// Default token, used for every owner without an entry in `tokens`.
    #[serde(default)]
    pub token: String,
    /// Login of the operator; their own PRs are never reported.
    #[serde(default)]
    pub username: String,
    /// Owner-specific tokens: owner -> token
    #[serde(default)]
    pub tokens: HashMap<String, String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Manual Debug impl to avoid leaking tokens
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut owners: Vec<&String> = self.tokens.keys().collect();
        owners.sort();
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("tokens", &owners)
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollerConfig {
    /// Repositories to watch as `owner/repo`. Empty means auto-discover.
    #[serde(default)]
    pub repos: Vec<String>,
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            repos: Vec::new(),
            poll_interval_seconds: default_poll_interval_seconds(),
        }
    }
}

/// Fallback for the default token when none is configured.
const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_poll_interval_seconds() -> u64 {
    300
}

impl AppConfig {
    /// Load configuration from a file and `PRWATCH`-prefixed environment variables,
    /// then validate it.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            // Try default paths
            builder = builder.add_source(config::File::with_name("prwatch").required(false));
        }

        // Environment variable overrides with PRWATCH_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("PRWATCH")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("poller.repos")
                .try_parsing(true),
        );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;

        if config.github.token.is_empty() {
            if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
                config.github.token = token;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.github.token.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Missing required field: github.token (set {TOKEN_ENV_VAR} or add it to the config)"
            )));
        }

        if self.github.username.trim().is_empty() {
            return Err(AppError::Config(
                "Missing required field: github.username".to_string(),
            ));
        }

        if let Some(repo) = self
            .poller
            .repos
            .iter()
            .find(|repo| split_repo(repo).is_none())
        {
            return Err(AppError::Config(format!(
                "Invalid repo format: {repo} (expected owner/repo)"
            )));
        }

        if self.poller.poll_interval_seconds == 0 {
            return Err(AppError::Config(
                "poller.poll_interval_seconds must be greater than zero".to_string(),
            ));
        }

        let credentials = self.credentials();
        if let Some((first, second)) = credentials.case_collisions().first() {
            return Err(AppError::Config(format!(
                "github.tokens has owners differing only by case: {first}, {second}"
            )));
        }

        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.github.token.clone(), self.github.tokens.clone())
    }

    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            repos: self.poller.repos.clone(),
            poll_interval: Duration::from_secs(self.poller.poll_interval_seconds),
            self_login: self.github.username.clone(),
            credentials: self.credentials(),
        }
    }
}
