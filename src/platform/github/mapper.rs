use crate::platform::types;

/// Map an octocrab pull request to our platform `PullRequest` type.
pub fn map_pull_request(pr: octocrab::models::pulls::PullRequest) -> types::PullRequest {
    types::PullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        author: pr.user.map(|user| user.login).unwrap_or_default(),
        head_sha: pr.head.sha,
        updated_at: pr.updated_at,
        html_url: pr.html_url.map(|url| url.to_string()).unwrap_or_default(),
    }
}

/// Full name of a repository, if GitHub reported one.
pub fn map_repo_full_name(repo: octocrab::models::Repository) -> Option<String> {
    repo.full_name
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn author(login: &str) -> serde_json::Value {
        let base = format!("https://api.github.com/users/{login}");
        json!({
            "login": login,
            "id": 7,
            "node_id": "MDQ6VXNlcjc=",
            "avatar_url": "https://avatars.githubusercontent.com/u/7",
            "gravatar_id": "",
            "url": base,
            "html_url": format!("https://github.com/{login}"),
            "followers_url": format!("{base}/followers"),
            "following_url": format!("{base}/following"),
            "gists_url": format!("{base}/gists"),
            "starred_url": format!("{base}/starred"),
            "subscriptions_url": format!("{base}/subscriptions"),
            "organizations_url": format!("{base}/orgs"),
            "repos_url": format!("{base}/repos"),
            "events_url": format!("{base}/events"),
            "received_events_url": format!("{base}/received_events"),
            "type": "User",
            "site_admin": false
        })
    }

    fn pull_request_json(number: u64) -> serde_json::Value {
        json!({
            "url": format!("https://api.github.com/repos/owner/repo/pulls/{number}"),
            "id": 1000 + number,
            "number": number,
            "head": { "ref": "feature", "sha": "abc123" },
            "base": { "ref": "main", "sha": "def456" }
        })
    }

    #[test]
    fn test_map_pull_request_with_all_fields() {
        let mut raw = pull_request_json(42);
        raw["title"] = json!("Add poller");
        raw["user"] = author("alice");
        raw["html_url"] = json!("https://github.com/owner/repo/pull/42");
        raw["updated_at"] = json!("2024-03-01T12:00:00Z");

        let pr: octocrab::models::pulls::PullRequest = serde_json::from_value(raw).unwrap();
        let mapped = map_pull_request(pr);

        assert_eq!(mapped.number, 42);
        assert_eq!(mapped.title, "Add poller");
        assert_eq!(mapped.author, "alice");
        assert_eq!(mapped.head_sha, "abc123");
        assert_eq!(mapped.html_url, "https://github.com/owner/repo/pull/42");
        assert_eq!(
            mapped.updated_at.map(|t| t.to_rfc3339()),
            Some("2024-03-01T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_map_pull_request_without_user_title_or_url() {
        let mut raw = pull_request_json(7);
        raw["user"] = serde_json::Value::Null;

        let pr: octocrab::models::pulls::PullRequest = serde_json::from_value(raw).unwrap();
        let mapped = map_pull_request(pr);

        assert_eq!(mapped.number, 7);
        assert_eq!(mapped.author, "");
        assert_eq!(mapped.title, "");
        assert_eq!(mapped.html_url, "");
        assert_eq!(mapped.head_sha, "abc123");
        assert!(mapped.updated_at.is_none());
    }

    #[test]
    fn test_map_repo_full_name() {
        let raw = json!({
            "id": 1,
            "name": "repo",
            "url": "https://api.github.com/repos/owner/repo"
        });
        let repo: octocrab::models::Repository = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(map_repo_full_name(repo), None);

        let mut named = raw;
        named["full_name"] = json!("owner/repo");
        let repo: octocrab::models::Repository = serde_json::from_value(named).unwrap();
        assert_eq!(map_repo_full_name(repo), Some("owner/repo".to_string()));
    }
}
