use crate::cli::DownloadParams;
use crate::download::{BatchReport, download_all, plan_tasks};
use crate::error::OrderFetchError;
use tracing;

/// Exit status signalling that some images could not be fetched. The batch
/// itself completed, so callers may treat it as a warning.
pub const PARTIAL_FAILURE_EXIT_CODE: u8 = 2;

pub async fn run_download(params: DownloadParams) -> Result<BatchReport, OrderFetchError> {
    let DownloadParams {
        orders,
        output_dir,
        options,
    } = params;

    tracing::info!("Planning downloads into {}", output_dir.display());
    let plan = plan_tasks(&orders, &output_dir);
    tracing::info!(
        "{} images to download ({} already present, {} duplicate references, {} unusable references)",
        plan.total(),
        plan.skipped_existing,
        plan.duplicates,
        plan.rejected
    );

    let report = download_all(plan.tasks, &output_dir, options).await?;

    if let Some(failure_log) = &report.failure_log {
        tracing::warn!(
            "{} of {} downloads failed, see {}",
            report.failed.len(),
            report.total,
            failure_log.display()
        );
    } else if !report.is_success() {
        tracing::warn!("{} of {} downloads failed", report.failed.len(), report.total);
    }

    Ok(report)
}

pub fn exit_code(report: &BatchReport) -> u8 {
    if report.is_success() {
        0
    } else {
        PARTIAL_FAILURE_EXIT_CODE
    }
}
