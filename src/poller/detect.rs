use crate::platform::types::PullRequest;

use super::types::{ChangeEvent, ChangeKind, RepoSnapshot};

/// Compare the current PR list of `repo` against its previous snapshot.
///
/// Events come out in the order of `current`. PRs missing from `current`
/// are dropped without an event.
pub fn detect(previous: &RepoSnapshot, repo: &str, current: &[PullRequest]) -> Vec<ChangeEvent> {
    current
        .iter()
        .filter_map(|pr| {
            let kind = match previous.get(&pr.number) {
                None => ChangeKind::NewPr,
                Some(state) if state.head_sha != pr.head_sha => ChangeKind::NewCommits {
                    old_sha: state.head_sha.clone(),
                    new_sha: pr.head_sha.clone(),
                },
                Some(_) => return None,
            };
            Some(ChangeEvent {
                repo: repo.to_string(),
                pull_request: pr.clone(),
                kind,
            })
        })
        .collect()
}
