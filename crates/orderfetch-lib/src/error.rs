use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load orders from {path}: {reason}")]
    OrdersLoad { path: PathBuf, reason: String },

    #[error("Failed to write failure log to {path}: {reason}")]
    FailureLogSave { path: PathBuf, reason: String },

    #[error("Invalid command line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

/// Errors that can classify themselves as transient.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

/// Outcome of a single failed fetch attempt.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Server responded with HTTP {status}")]
    BadStatus { status: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Attempt timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("Failed to write {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create destination directory {path}: {source}")]
    DestinationDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Short stable name of the error class, used in logs and the failure log.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::BadStatus { .. } => "BadStatus",
            FetchError::Transport(_) => "TransportError",
            FetchError::Timeout { .. } => "Timeout",
            FetchError::Storage { .. } => "StorageError",
            FetchError::DestinationDirectory { .. } => "StorageError",
        }
    }
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::BadStatus { .. } => true,
            FetchError::Transport(_) => true,
            FetchError::Timeout { .. } => true,
            // Disk contention while streaming may clear up on the next attempt
            FetchError::Storage { .. } => true,
            FetchError::DestinationDirectory { .. } => false,
        }
    }
}
