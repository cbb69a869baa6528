mod args;
mod download;
mod params;
mod plan;
mod resolved_command;

pub use args::{Args, Command, parse_args};
pub use download::{PARTIAL_FAILURE_EXIT_CODE, exit_code, run_download};
pub use params::{DownloadParams, PlanParams};
pub use plan::run_plan;
pub use resolved_command::{ResolvedCommand, resolve_command};
