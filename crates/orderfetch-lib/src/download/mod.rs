mod batch;
mod failures;
mod fetch;
mod gate;
mod progress;
mod retry;
mod source;
mod types;

pub use batch::{download_all, download_all_with};
pub use failures::{FAILURE_LOG_FILE_NAME, write_failure_log};
pub use fetch::{Deadline, FetchExecutor, persist_stream};
pub use gate::{Admission, AdmissionGate};
pub use progress::{BatchState, ProgressReporter, progress_line};
pub use retry::RetryPolicy;
pub use source::{DELIVERY_PHOTOS_DIR, PRODUCT_THUMBNAILS_DIR, TaskPlan, plan_tasks};
pub use types::{BatchReport, DownloadOptions, DownloadTask, FailedTask, FailureRecord};
