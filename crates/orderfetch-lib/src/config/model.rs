use crate::download::DownloadOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON file written by the order-history exporter.
    #[serde(default)]
    pub orders_path: Option<PathBuf>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DownloadConfig {
    pub concurrency_limit: Option<usize>,
    pub attempt_timeout_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl DownloadConfig {
    /// Fills unset values from the built-in defaults.
    pub fn to_options(&self) -> DownloadOptions {
        let defaults = DownloadOptions::default();
        DownloadOptions {
            concurrency_limit: self.concurrency_limit.unwrap_or(defaults.concurrency_limit),
            attempt_timeout: self
                .attempt_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.attempt_timeout),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            retry_delay: self
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        }
    }
}
