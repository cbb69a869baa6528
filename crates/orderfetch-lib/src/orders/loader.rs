use super::OrderRecord;
use crate::error::OrderFetchError;
use std::path::Path;

/// Reads the exporter's JSON array of order records.
pub fn load_orders(path: &Path) -> Result<Vec<OrderRecord>, OrderFetchError> {
    let content = std::fs::read(path).map_err(|e| OrderFetchError::OrdersLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    serde_json::from_slice(&content).map_err(|e| OrderFetchError::OrdersLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_orders_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(
            &path,
            r#"[{ "dateTime": "2024-01-30 00:00", "items": [{ "thumbnailUrl": "https://a/b.png" }] }]"#,
        )
        .unwrap();

        let orders = load_orders(&path).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items.len(), 1);
    }

    #[test]
    fn test_load_orders_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        match load_orders(&path) {
            Err(OrderFetchError::OrdersLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_orders_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_orders(&path),
            Err(OrderFetchError::OrdersLoad { .. })
        ));
    }
}
