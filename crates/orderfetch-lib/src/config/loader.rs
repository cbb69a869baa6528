use super::Config;
use crate::error::OrderFetchError;
use config::Config as ConfigBuilder;

pub fn load_config(config_path: &str) -> Result<Config, OrderFetchError> {
    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(config_path))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_yaml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orderfetch.yaml");
        std::fs::write(
            &path,
            "orders_path: orders.json\noutput:\n  path: archive\ndownload:\n  concurrency_limit: 2\n  retry_delay_ms: 250\n",
        )
        .unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();

        assert_eq!(config.orders_path, Some(PathBuf::from("orders.json")));
        assert_eq!(config.output.path, Some(PathBuf::from("archive")));
        assert_eq!(config.download.concurrency_limit, Some(2));
        assert_eq!(config.download.retry_delay_ms, Some(250));
        assert_eq!(config.download.max_attempts, None);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orderfetch.toml");
        std::fs::write(&path, "[download]\nconcurency_limit = 2\n").unwrap();

        assert!(matches!(
            load_config(path.to_str().unwrap()),
            Err(OrderFetchError::Config(_))
        ));
    }
}
