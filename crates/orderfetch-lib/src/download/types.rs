use crate::error::FetchError;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// One URL-to-file unit of work. Never modified after planning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTask {
    pub source_url: Url,
    pub destination_path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Maximum number of fetches in flight at once.
    pub concurrency_limit: usize,
    /// Time budget for a single attempt, headers and body included.
    pub attempt_timeout: Duration,
    /// Total attempts per task, the first one included.
    pub max_attempts: u32,
    /// Fixed pause between two attempts of the same task.
    pub retry_delay: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: 5,
            attempt_timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// A task that exhausted its attempts, or hit a non-retryable error.
#[derive(Debug)]
pub struct FailedTask {
    pub task: DownloadTask,
    pub attempts: u32,
    pub last_error: FetchError,
}

/// Entry of `failed_downloads.json`.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub url: String,
    pub dest_path: String,
    pub error: String,
}

impl From<&FailedTask> for FailureRecord {
    fn from(failed: &FailedTask) -> Self {
        Self {
            url: failed.task.source_url.to_string(),
            dest_path: failed.task.destination_path.display().to_string(),
            error: format!("{}: {}", failed.last_error.kind(), failed.last_error),
        }
    }
}

/// Final accounting for one batch.
#[derive(Debug)]
pub struct BatchReport {
    pub total: usize,
    pub completed: usize,
    pub failed: Vec<FailedTask>,
    /// Highest number of simultaneously admitted fetches observed.
    pub peak_in_flight: usize,
    pub failure_log: Option<PathBuf>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
