use std::io::Write;

use serde::Deserialize;

use crate::error::Result;
use crate::poller::types::{ChangeEvent, ChangeKind};

/// Which kinds of change are worth telling the operator about.
#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub new_prs: bool,
    #[serde(default = "default_true")]
    pub new_commits: bool,
    #[serde(default = "default_true")]
    pub new_comments: bool,
    #[serde(default = "default_true")]
    pub status_changes: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            new_prs: true,
            new_commits: true,
            new_comments: true,
            status_changes: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl NotificationConfig {
    pub fn wants(&self, kind: &ChangeKind) -> bool {
        match kind {
            ChangeKind::NewPr => self.new_prs,
            ChangeKind::NewCommits { .. } => self.new_commits,
            ChangeKind::NewComments { .. } => self.new_comments,
            ChangeKind::StatusChanged { .. } => self.status_changes,
        }
    }
}

/// How reported changes leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmitFormat {
    /// One structured log event per change.
    Log,
    /// One JSON object per line on stdout.
    Json,
}

/// Delivers batches of changes from the poller to the operator.
pub struct Reporter {
    notifications: NotificationConfig,
    format: EmitFormat,
}

impl Reporter {
    pub fn new(notifications: NotificationConfig, format: EmitFormat) -> Self {
        Self {
            notifications,
            format,
        }
    }

    pub fn report(&self, changes: Vec<ChangeEvent>) {
        let changes = self.filter(changes);
        match self.format {
            EmitFormat::Log => {
                for change in &changes {
                    tracing::info!(
                        repo = %change.repo,
                        number = change.pull_request.number,
                        author = %change.pull_request.author,
                        url = %change.pull_request.html_url,
                        "{}",
                        change.description()
                    );
                }
            }
            EmitFormat::Json => {
                let stdout = std::io::stdout();
                if let Err(e) = write_json_lines(&changes, &mut stdout.lock()) {
                    tracing::error!(error = %e, "Failed to write changes");
                }
            }
        }
    }

    fn filter(&self, changes: Vec<ChangeEvent>) -> Vec<ChangeEvent> {
        changes
            .into_iter()
            .filter(|change| self.notifications.wants(&change.kind))
            .collect()
    }
}

fn write_json_lines<W: Write>(changes: &[ChangeEvent], out: &mut W) -> Result<()> {
    for change in changes {
        serde_json::to_writer(&mut *out, change)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
