use eyre::Result;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An order as the exporter writes it, with image references pointing at `base_url`.
pub fn exported_order(
    base_url: &str,
    date_time: &str,
    photo: Option<&str>,
    thumbnails: &[&str],
) -> serde_json::Value {
    let items = thumbnails
        .iter()
        .map(|t| {
            json!({
                "name": t.trim_start_matches('/'),
                "unitPrice": "1.00",
                "unitDescription": "each",
                "quantity": "1",
                "thumbnailUrl": format!("{base_url}{t}"),
            })
        })
        .collect::<Vec<_>>();
    let photo = photo.map(|p| format!("{base_url}{p}"));

    json!({
        "dateTime": date_time,
        "itemCount": format!("{} items", thumbnails.len()),
        "total": "12.34",
        "url": format!("{base_url}/orders/{date_time}"),
        "cancelled": false,
        "deliveryPhotoUrl": photo,
        "items": items,
    })
}

pub fn setup_test_environment(orders: &[serde_json::Value]) -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;

    let orders_path = temp_dir.path().join("orders.json");
    std::fs::write(&orders_path, serde_json::to_string_pretty(orders)?)?;

    Ok((temp_dir, orders_path))
}

/// Serves `body` at `route`, optionally after `delay`.
pub async fn mount_image(server: &MockServer, route: &str, body: &[u8], delay: Option<Duration>) {
    let mut response = ResponseTemplate::new(200).set_body_bytes(body.to_vec());
    if let Some(delay) = delay {
        response = response.set_delay(delay);
    }
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn read_failure_log(output_dir: &Path) -> Result<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(output_dir.join("failed_downloads.json"))?;
    Ok(serde_json::from_str(&content)?)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("orderfetch_lib=debug,orderfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
