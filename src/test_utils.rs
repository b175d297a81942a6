//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::credentials::Credentials;
use crate::error::{AppError, Result};
use crate::poller::types::ChangeEvent;
use crate::poller::PollerSettings;
use crate::platform::types::PullRequest;
use crate::platform::Platform;

pub const DEFAULT_TOKEN: &str = "default-token";

pub fn pull_request(number: u64, author: &str, head_sha: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("PR {number}"),
        author: author.to_string(),
        head_sha: head_sha.to_string(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
        html_url: format!("https://github.com/owner/repo/pull/{number}"),
    }
}

/// Settings polling `repos` as user `me` with only the default token.
pub fn settings(repos: &[&str]) -> PollerSettings {
    PollerSettings {
        repos: repos.iter().map(|r| r.to_string()).collect(),
        poll_interval: Duration::from_secs(60),
        self_login: "me".to_string(),
        credentials: Credentials::new(DEFAULT_TOKEN, HashMap::new()),
    }
}

/// In-memory `Platform` with scripted responses.
///
/// Repositories and tokens without a scripted response fail with a
/// "not found" error.
#[derive(Default)]
pub struct FakePlatform {
    pulls: Mutex<HashMap<String, std::result::Result<Vec<PullRequest>, String>>>,
    repos: Mutex<HashMap<String, std::result::Result<Vec<String>, String>>>,
    pull_calls: Mutex<Vec<(String, String)>>,
    discovery_calls: AtomicUsize,
    latency: Mutex<Option<Duration>>,
}

impl FakePlatform {
    /// Make every PR listing take `latency` on the tokio clock before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn set_pulls(&self, repo: &str, pulls: Vec<PullRequest>) {
        self.pulls.lock().unwrap().insert(repo.to_string(), Ok(pulls));
    }

    pub fn fail_pulls(&self, repo: &str) {
        self.pulls
            .lock()
            .unwrap()
            .insert(repo.to_string(), Err("HTTP error: 502".to_string()));
    }

    pub fn set_repos(&self, token: &str, repos: &[&str]) {
        self.repos.lock().unwrap().insert(
            token.to_string(),
            Ok(repos.iter().map(|r| r.to_string()).collect()),
        );
    }

    pub fn fail_repos(&self, token: &str) {
        self.repos
            .lock()
            .unwrap()
            .insert(token.to_string(), Err("Bad credentials".to_string()));
    }

    /// Every `(owner/repo, token)` pair PRs were listed for, in call order.
    pub fn pull_calls(&self) -> Vec<(String, String)> {
        self.pull_calls.lock().unwrap().clone()
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<Vec<PullRequest>> {
        let full_name = format!("{owner}/{repo}");
        self.pull_calls
            .lock()
            .unwrap()
            .push((full_name.clone(), token.to_string()));

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match self.pulls.lock().unwrap().get(&full_name) {
            Some(Ok(pulls)) => Ok(pulls.clone()),
            Some(Err(message)) => Err(AppError::GitHubApi(message.clone())),
            None => Err(AppError::GitHubApi(format!("{full_name} not found"))),
        }
    }

    async fn list_accessible_repos(&self, token: &str) -> Result<Vec<String>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);

        match self.repos.lock().unwrap().get(token) {
            Some(Ok(repos)) => Ok(repos.clone()),
            Some(Err(message)) => Err(AppError::GitHubApi(message.clone())),
            None => Err(AppError::GitHubApi("token not recognised".to_string())),
        }
    }
}

/// Collects every batch handed to a change handler.
#[derive(Clone, Default)]
pub struct Recorder {
    batches: Arc<Mutex<Vec<Vec<ChangeEvent>>>>,
}

impl Recorder {
    pub fn handler(&self) -> impl Fn(Vec<ChangeEvent>) + Send + Sync + 'static {
        let batches = Arc::clone(&self.batches);
        move |changes| batches.lock().unwrap().push(changes)
    }

    pub fn batches(&self) -> Vec<Vec<ChangeEvent>> {
        self.batches.lock().unwrap().clone()
    }

    /// Remove and return the batches recorded so far.
    pub fn take(&self) -> Vec<Vec<ChangeEvent>> {
        std::mem::take(&mut *self.batches.lock().unwrap())
    }
}

/// Let spawned tasks run to completion under a paused test clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
