use super::types::{FailedTask, FailureRecord};
use crate::error::OrderFetchError;
use std::path::{Path, PathBuf};

pub const FAILURE_LOG_FILE_NAME: &str = "failed_downloads.json";

/// Writes `failed_downloads.json` under `output_dir` for operator inspection.
///
/// With no failures any log left by an earlier run is removed, so the file
/// only ever describes the latest batch. Returns the path written, if any.
pub fn write_failure_log(
    output_dir: &Path,
    failed: &[FailedTask],
) -> Result<Option<PathBuf>, OrderFetchError> {
    let path = output_dir.join(FAILURE_LOG_FILE_NAME);

    if failed.is_empty() {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed stale failure log"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        return Ok(None);
    }

    let records = failed.iter().map(FailureRecord::from).collect::<Vec<_>>();
    let content = serde_json::to_string_pretty(&records)?;

    std::fs::create_dir_all(output_dir)
        .and_then(|()| std::fs::write(&path, content))
        .map_err(|e| OrderFetchError::FailureLogSave {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    Ok(Some(path))
}
