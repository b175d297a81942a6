//! Pull request change detection.
//!
//! A [`Poller`] periodically lists the open PRs of every configured (or
//! discovered) repository, diffs them against the state it saw last time and
//! hands each non-empty batch of changes to the registered handler.
//!
//! # Overlapping polls
//!
//! Scheduled ticks and [`Poller::poll_now`] never wait for each other. Each
//! repo's compare-and-replace of its snapshot is atomic, but batches reach the
//! handler in the order their cycles finish rather than the order they
//! started. A slow cycle that finishes last can overwrite a snapshot with data
//! older than a faster cycle already committed; the following cycle then
//! reports that difference again.

pub mod detect;
mod scheduler;
pub mod types;


use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::credentials::Credentials;
use crate::platform::types::split_repo;
use crate::platform::Platform;

use types::{snapshot_of, ChangeEvent, RepoSnapshot};

/// Receives every non-empty batch of changes, once per poll cycle.
pub type ChangeHandler = Arc<dyn Fn(Vec<ChangeEvent>) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct PollerSettings {
    /// `owner/repo` names to poll. Empty means discover them from the tokens.
    pub repos: Vec<String>,
    pub poll_interval: Duration,
    /// Changes to PRs authored by this login are never reported.
    pub self_login: String,
    pub credentials: Credentials,
}

/// Per-repo snapshots plus the discovery cache, behind one lock.
#[derive(Default)]
struct PollState {
    snapshots: HashMap<String, RepoSnapshot>,
    discovered_repos: Option<Vec<String>>,
}

#[derive(Default)]
struct Lifecycle {
    handler: Option<ChangeHandler>,
    schedule: Option<JoinHandle<()>>,
}

pub struct Poller {
    inner: Arc<Inner>,
}

struct Inner {
    settings: PollerSettings,
    platform: Arc<dyn Platform>,
    state: Mutex<PollState>,
    lifecycle: Mutex<Lifecycle>,
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Poller {
    pub fn new(settings: PollerSettings, platform: Arc<dyn Platform>) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                platform,
                state: Mutex::new(PollState::default()),
                lifecycle: Mutex::new(Lifecycle::default()),
            }),
        }
    }

    /// Run one poll cycle now, whether or not the schedule is active.
    pub async fn poll_now(&self) {
        self.inner.poll().await;
    }

    /// Run one poll cycle and return its changes instead of handing them to
    /// the registered handler. Snapshots are updated as in any other cycle.
    pub async fn collect_changes(&self) -> Vec<ChangeEvent> {
        self.inner.collect_changes().await
    }

    /// Forget every snapshot and the discovered repo list.
    ///
    /// The next poll reports every open PR as new.
    pub fn clear_state(&self) {
        let mut state = lock(&self.inner.state);
        state.snapshots.clear();
        state.discovered_repos = None;
        tracing::info!("Cleared poller state");
    }

    /// The last successfully fetched state of `repo`, if any.
    pub fn snapshot(&self, repo: &str) -> Option<RepoSnapshot> {
        lock(&self.inner.state).snapshots.get(repo).cloned()
    }
}

impl Inner {
    async fn poll(&self) {
        let changes = self.collect_changes().await;
        if changes.is_empty() {
            return;
        }

        let handler = lock(&self.lifecycle).handler.clone();
        match handler {
            Some(handler) => {
                tracing::info!(count = changes.len(), "Detected pull request changes");
                handler(changes);
            }
            None => {
                tracing::debug!(
                    count = changes.len(),
                    "No change handler registered, dropping changes"
                );
            }
        }
    }

    async fn collect_changes(&self) -> Vec<ChangeEvent> {
        let repos = self.repos_to_poll().await;

        let fetches: Vec<_> = repos
            .iter()
            .filter_map(|full_name| {
                let (owner, name) = split_repo(full_name)?;
                let Some(token) = self.settings.credentials.resolve(owner) else {
                    tracing::warn!(repo = %full_name, "No token for repository owner, skipping");
                    return None;
                };
                Some(self.poll_repo(full_name, owner, name, token))
            })
            .collect();

        let changes: Vec<ChangeEvent> = join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .filter(|change| change.pull_request.author != self.settings.self_login)
            .collect();

        tracing::debug!(
            repos = repos.len(),
            changes = changes.len(),
            "Poll cycle finished"
        );

        changes
    }

    /// Fetch one repository and diff it against its snapshot.
    ///
    /// On failure the snapshot is left alone and nothing is reported.
    async fn poll_repo(
        &self,
        full_name: &str,
        owner: &str,
        name: &str,
        token: &str,
    ) -> Vec<ChangeEvent> {
        let pull_requests = match self
            .platform
            .list_open_pull_requests(owner, name, token)
            .await
        {
            Ok(pull_requests) => pull_requests,
            Err(e) => {
                tracing::warn!(repo = %full_name, error = %e, "Failed to poll repository");
                return Vec::new();
            }
        };

        let mut state = lock(&self.state);
        let changes = match state.snapshots.get(full_name) {
            Some(previous) => detect::detect(previous, full_name, &pull_requests),
            None => detect::detect(&RepoSnapshot::new(), full_name, &pull_requests),
        };
        state
            .snapshots
            .insert(full_name.to_string(), snapshot_of(&pull_requests));

        changes
    }

    async fn repos_to_poll(&self) -> Vec<String> {
        if !self.settings.repos.is_empty() {
            return self.settings.repos.clone();
        }

        let cached = lock(&self.state).discovered_repos.clone();
        if let Some(repos) = cached {
            return repos;
        }

        let discovered = self.discover_repos().await;
        lock(&self.state).discovered_repos = Some(discovered.clone());
        discovered
    }

    /// Union of the repositories visible to every distinct token, sorted.
    async fn discover_repos(&self) -> Vec<String> {
        let lookups: Vec<_> = self
            .settings
            .credentials
            .distinct()
            .into_iter()
            .map(|token| async move {
                match self.platform.list_accessible_repos(token).await {
                    Ok(repos) => repos,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to discover repositories for token");
                        Vec::new()
                    }
                }
            })
            .collect();

        let repos: BTreeSet<String> = join_all(lookups).await.into_iter().flatten().collect();

        tracing::info!(count = repos.len(), "Discovered repositories");

        repos.into_iter().collect()
    }
}
