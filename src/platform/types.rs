use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open pull request as seen at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Login of the user who opened the PR.
    pub author: String,
    /// Commit at the tip of the PR's source branch.
    pub head_sha: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: String,
}

/// Split an `owner/repo` full name into its two parts.
///
/// Returns `None` unless the name has exactly two non-empty segments.
pub fn split_repo(full_name: &str) -> Option<(&str, &str)> {
    let mut parts = full_name.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            Some((owner, name))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_repo_accepts_owner_and_name() {
        assert_eq!(split_repo("octo/hello"), Some(("octo", "hello")));
        assert_eq!(split_repo("my-org/my_repo"), Some(("my-org", "my_repo")));
    }

    #[test]
    fn test_split_repo_rejects_malformed() {
        assert_eq!(split_repo("invalid"), None);
        assert_eq!(split_repo(""), None);
        assert_eq!(split_repo("/repo"), None);
        assert_eq!(split_repo("owner/"), None);
        assert_eq!(split_repo("a/b/c"), None);
        assert_eq!(split_repo("a//b"), None);
    }
}
