use crate::download::DownloadOptions;
use crate::orders::OrderRecord;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DownloadParams {
    pub orders: Vec<OrderRecord>,
    pub output_dir: PathBuf,
    pub options: DownloadOptions,
}

#[derive(Debug, Clone)]
pub struct PlanParams {
    pub orders: Vec<OrderRecord>,
    pub output_dir: PathBuf,
}
