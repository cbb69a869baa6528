use super::failures::write_failure_log;
use super::fetch::FetchExecutor;
use super::gate::AdmissionGate;
use super::progress::{BatchState, ProgressReporter};
use super::retry::RetryPolicy;
use super::types::{BatchReport, DownloadOptions, DownloadTask, FailedTask};
use crate::error::OrderFetchError;
use eyre::WrapErr;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::Path;

/// Downloads every task and accounts for each outcome.
///
/// Individual task failures never fail the batch; they are collected in the
/// report and in `failed_downloads.json` under `output_dir`. The returned error
/// is reserved for problems that prevent the batch from running at all.
pub async fn download_all(
    tasks: Vec<DownloadTask>,
    output_dir: impl AsRef<Path>,
    options: DownloadOptions,
) -> Result<BatchReport, OrderFetchError> {
    let executor = FetchExecutor::new(options.attempt_timeout)?;
    download_all_with(&executor, tasks, output_dir.as_ref(), options).await
}

pub async fn download_all_with(
    executor: &FetchExecutor,
    tasks: Vec<DownloadTask>,
    output_dir: &Path,
    options: DownloadOptions,
) -> Result<BatchReport, OrderFetchError> {
    let gate = AdmissionGate::new(options.concurrency_limit);
    let policy = RetryPolicy::from(&options);
    let progress = ProgressReporter;
    let mut state = BatchState::new(tasks.len());

    tracing::info!(
        total = state.total(),
        concurrency_limit = gate.limit(),
        "Starting downloads..."
    );

    // Futures are pushed in task order, so they reach the gate in that order.
    let mut futs = FuturesUnordered::new();
    for task in tasks {
        let gate = &gate;
        futs.push(async move {
            let _admission = gate.admit().await?;
            tracing::debug!(
                url = %task.source_url,
                output = %task.destination_path.display(),
                in_flight = gate.in_flight(),
                "Downloading"
            );

            let (attempts, result) = {
                let task = &task;
                policy
                    .run(move |attempt| {
                        tracing::trace!(url = %task.source_url, attempt, "Attempting");
                        executor.fetch(task)
                    })
                    .await
            };
            Ok::<_, tokio::sync::AcquireError>((task, attempts, result))
        });
    }

    while let Some(outcome) = futs.next().await {
        let (task, attempts, result) = outcome.wrap_err("Admission gate closed unexpectedly")?;
        match result {
            Ok(bytes) => {
                tracing::info!(
                    url = %task.source_url,
                    output = %task.destination_path.display(),
                    bytes,
                    attempts,
                    "Downloaded"
                );
                state.record_success(&task);
            }
            Err(last_error) => {
                tracing::warn!(
                    url = %task.source_url,
                    output = %task.destination_path.display(),
                    attempts,
                    "Download failed permanently: {}",
                    last_error
                );
                state.record_failure(FailedTask {
                    task,
                    attempts,
                    last_error,
                });
            }
        }
        progress.report(&state);
    }
    drop(futs);

    let failure_log = match write_failure_log(output_dir, state.failed()) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Could not write failure log: {:#}", e);
            None
        }
    };

    let peak_in_flight = gate.peak_in_flight();
    let (total, completed, failed) = state.into_parts();

    if failed.is_empty() {
        tracing::info!(total, completed, "All downloads finished");
    } else {
        tracing::warn!(
            total,
            completed,
            failed = failed.len(),
            "{} downloads failed",
            failed.len()
        );
        for failure in &failed {
            tracing::warn!(
                url = %failure.task.source_url,
                output = %failure.task.destination_path.display(),
                "{}",
                failure.last_error
            );
        }
    }

    Ok(BatchReport {
        total,
        completed,
        failed,
        peak_in_flight,
        failure_log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_options(concurrency_limit: usize) -> DownloadOptions {
        DownloadOptions {
            concurrency_limit,
            attempt_timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_delay: Duration::from_millis(10),
        }
    }

    fn task(server: &MockServer, route: &str, output: &Path) -> DownloadTask {
        DownloadTask {
            source_url: Url::parse(&format!("{}{}", server.uri(), route)).unwrap(),
            destination_path: output.join(route.trim_start_matches('/')),
        }
    }

    #[tokio::test]
    async fn test_mixed_batch_accounting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken.png"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![
            task(&server, "/ok.png", dir.path()),
            task(&server, "/broken.png", dir.path()),
        ];

        let report = download_all(tasks, dir.path(), fast_options(2)).await.unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.completed + report.failed.len(), report.total);
        assert!(!report.is_success());
        assert_eq!(report.failed[0].attempts, 3);
        assert!(matches!(
            report.failed[0].last_error,
            crate::error::FetchError::BadStatus { status: 500 }
        ));
        assert_eq!(
            report.failure_log.as_deref(),
            Some(dir.path().join("failed_downloads.json").as_path())
        );
        assert!(dir.path().join("ok.png").exists());
        assert!(!dir.path().join("broken.png").exists());
    }

    #[tokio::test]
    async fn test_transient_failure_recovers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky.png"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let report = download_all(
            vec![task(&server, "/flaky.png", dir.path())],
            dir.path(),
            fast_options(1),
        )
        .await
        .unwrap();

        assert!(report.is_success());
        assert_eq!(report.completed, 1);
        assert_eq!(report.failure_log, None);
        assert_eq!(std::fs::read(dir.path().join("flaky.png")).unwrap(), b"ok");
    }

    #[tokio::test]
    async fn test_unwritable_failure_log_does_not_fail_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the log's file name makes the write fail.
        std::fs::create_dir(dir.path().join("failed_downloads.json")).unwrap();

        let report = download_all(
            vec![task(&server, "/gone.png", dir.path())],
            dir.path(),
            fast_options(1),
        )
        .await
        .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failure_log, None);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let dir = tempfile::tempdir().unwrap();

        let report = download_all(Vec::new(), dir.path(), DownloadOptions::default())
            .await
            .unwrap();

        assert_eq!(report.total, 0);
        assert!(report.is_success());
        assert_eq!(report.peak_in_flight, 0);
    }
}
