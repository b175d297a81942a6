use async_trait::async_trait;
use octocrab::Octocrab;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

use super::mapper;

pub struct GitHubPlatform {
    api_url: String,
    request_timeout: Duration,
    /// Cache of authenticated clients: token -> client
    client_cache: Arc<RwLock<HashMap<String, Octocrab>>>,
}

impl GitHubPlatform {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        if config.api_url.trim().is_empty() {
            return Err(AppError::Config("GitHub API URL must not be empty".to_string()));
        }

        Ok(Self {
            api_url: config.api_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            client_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Get an octocrab instance authenticated with the given token.
    async fn client(&self, token: &str) -> Result<Octocrab> {
        {
            let cache = self.client_cache.read().await;
            if let Some(client) = cache.get(token) {
                return Ok(client.clone());
            }
        }

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(self.api_url.as_str())
            .map_err(|e| AppError::Config(format!("Invalid GitHub API URL {}: {e}", self.api_url)))?
            .set_connect_timeout(Some(self.request_timeout))
            .set_read_timeout(Some(self.request_timeout))
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))?;

        let mut cache = self.client_cache.write().await;
        cache.insert(token.to_string(), client.clone());

        Ok(client)
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<Vec<PullRequest>> {
        let client = self.client(token).await?;

        let first_page = client
            .pulls(owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(100)
            .send()
            .await?;

        let pulls = client.all_pages(first_page).await?;

        tracing::debug!(owner, repo, count = pulls.len(), "Fetched open pull requests");

        Ok(pulls.into_iter().map(mapper::map_pull_request).collect())
    }

    async fn list_accessible_repos(&self, token: &str) -> Result<Vec<String>> {
        let client = self.client(token).await?;

        let first_page = client
            .current()
            .list_repos_for_authenticated_user()
            .per_page(100)
            .send()
            .await?;

        let repos = client.all_pages(first_page).await?;

        Ok(repos
            .into_iter()
            .filter_map(mapper::map_repo_full_name)
            .collect())
    }
}
