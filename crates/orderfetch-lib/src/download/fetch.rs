use super::types::DownloadTask;
use crate::error::FetchError;
use futures::stream::{Stream, StreamExt};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::time::Instant;
use url::Url;

const PARTIAL_SUFFIX: &str = ".part";

/// Performs single URL-to-file transfers.
///
/// A transfer either leaves the complete body at the destination or leaves
/// nothing there: bytes are streamed into a sibling `.part` file which is
/// renamed into place only once the body has been fully written.
#[derive(Clone, Debug)]
pub struct FetchExecutor {
    client: reqwest::Client,
    attempt_timeout: Duration,
}

impl FetchExecutor {
    pub fn new(attempt_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("orderfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, attempt_timeout))
    }

    pub fn with_client(client: reqwest::Client, attempt_timeout: Duration) -> Self {
        Self {
            client,
            attempt_timeout,
        }
    }

    /// Runs one attempt for `task`, returning the number of bytes stored.
    ///
    /// The attempt timeout bounds the request and each wait for body bytes.
    /// Local file work is never cut short by it.
    pub async fn fetch(&self, task: &DownloadTask) -> Result<u64, FetchError> {
        let destination = &task.destination_path;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| FetchError::DestinationDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let deadline = Deadline::after(self.attempt_timeout);
        let response = self.request(&task.source_url, deadline).await?;
        persist_stream(response.bytes_stream(), destination, deadline).await
    }

    async fn request(&self, url: &Url, deadline: Deadline) -> Result<reqwest::Response, FetchError> {
        let response = deadline.bound(self.client.get(url.clone()).send()).await??;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

/// Point in time by which an attempt's network work must be done.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Awaits `fut`, failing with [`FetchError::Timeout`] once the deadline passes.
    pub async fn bound<F: Future>(&self, fut: F) -> Result<F::Output, FetchError> {
        tokio::time::timeout_at(self.at, fut)
            .await
            .map_err(|_| FetchError::Timeout { after: self.budget })
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "Failed to remove partial download: {}", e),
    }
}

/// Streams `body` to `destination` through a `.part` file.
///
/// Waiting for the next chunk is bounded by `deadline`. On any error the
/// partial file is deleted and the destination is untouched.
pub async fn persist_stream<S, B, E>(
    body: S,
    destination: &Path,
    deadline: Deadline,
) -> Result<u64, FetchError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<FetchError>,
{
    let partial = partial_path(destination);
    let result = write_stream(body, &partial, deadline).await;

    let result = match result {
        Ok(written) => tokio::fs::rename(&partial, destination)
            .await
            .map(|()| written)
            .map_err(|source| FetchError::Storage {
                path: destination.to_path_buf(),
                source,
            }),
        Err(e) => Err(e),
    };

    if result.is_err() {
        discard_partial(&partial).await;
    }
    result
}

async fn write_stream<S, B, E>(body: S, path: &Path, deadline: Deadline) -> Result<u64, FetchError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<FetchError>,
{
    let storage_error = |source: std::io::Error| FetchError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::create(path).await.map_err(storage_error)?;
    let mut writer = BufWriter::new(file);
    let mut body = std::pin::pin!(body);
    let mut written = 0u64;

    while let Some(chunk) = deadline.bound(body.next()).await? {
        let chunk = chunk.map_err(Into::<FetchError>::into)?;
        let chunk = chunk.as_ref();
        writer.write_all(chunk).await.map_err(storage_error)?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(storage_error)?;
    writer.get_mut().sync_all().await.map_err(storage_error)?;
    Ok(written)
}
