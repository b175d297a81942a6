use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::types::PullRequest;

/// What changed about a pull request since the previous poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// First time this PR has been seen.
    NewPr,
    /// The head commit moved.
    NewCommits { old_sha: String, new_sha: String },
    /// Never produced from the PR list alone; needs comment data.
    NewComments { count: u64 },
    /// Never produced from the PR list alone; needs check-run data.
    StatusChanged {
        from: Option<String>,
        to: Option<String>,
    },
}

/// A single detected change, paired with the PR and the repo it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// `owner/repo`
    pub repo: String,
    pub pull_request: PullRequest,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn description(&self) -> String {
        let pr = &self.pull_request;
        match &self.kind {
            ChangeKind::NewPr => format!(
                "New PR #{} on {} by {}: {}",
                pr.number, self.repo, pr.author, pr.title
            ),
            ChangeKind::NewCommits { old_sha, new_sha } => format!(
                "New commits on PR #{} on {} ({} -> {})",
                pr.number,
                self.repo,
                short_sha(old_sha),
                short_sha(new_sha)
            ),
            ChangeKind::NewComments { count } => format!(
                "{count} new comment(s) on PR #{} on {}",
                pr.number, self.repo
            ),
            ChangeKind::StatusChanged { from, to } => format!(
                "Status of PR #{} on {} changed: {} -> {}",
                pr.number,
                self.repo,
                from.as_deref().unwrap_or("none"),
                to.as_deref().unwrap_or("none")
            ),
        }
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// Last observed state of one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrState {
    pub head_sha: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Last observed state of every open PR in one repository, keyed by number.
pub type RepoSnapshot = HashMap<u64, PrState>;

/// Build the snapshot that replaces a repo's previous one after a successful fetch.
pub fn snapshot_of(pull_requests: &[PullRequest]) -> RepoSnapshot {
    pull_requests
        .iter()
        .map(|pr| {
            (
                pr.number,
                PrState {
                    head_sha: pr.head_sha.clone(),
                    updated_at: pr.updated_at,
                },
            )
        })
        .collect()
}
