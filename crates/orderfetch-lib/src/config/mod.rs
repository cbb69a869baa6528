mod loader;
mod model;

pub use loader::load_config;
pub use model::{Config, DownloadConfig, OutputConfig};
