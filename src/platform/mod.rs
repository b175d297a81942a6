pub mod github;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// Remote source of pull request state.
///
/// Every call carries the token to authenticate with, so one platform can
/// serve repositories owned by different accounts.
#[async_trait]
pub trait Platform: Send + Sync {
    /// List every open pull request in a repository, across all pages.
    async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<Vec<PullRequest>>;

    /// List the `owner/repo` names of all repositories the token can access.
    async fn list_accessible_repos(&self, token: &str) -> Result<Vec<String>>;
}
