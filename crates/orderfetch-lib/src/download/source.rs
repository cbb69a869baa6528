use super::types::DownloadTask;
use crate::orders::OrderRecord;
use crate::utils::{dotted_extension, sanitize_file_name};
use itertools::Itertools;
use std::path::Path;
use url::Url;

pub const DELIVERY_PHOTOS_DIR: &str = "delivery_photos";
pub const PRODUCT_THUMBNAILS_DIR: &str = "product_thumbnails";

const DEFAULT_PHOTO_EXTENSION: &str = ".jpg";

/// Tasks still to be fetched, plus how many candidates were dropped and why.
#[derive(Debug, Default)]
pub struct TaskPlan {
    pub tasks: Vec<DownloadTask>,
    pub skipped_existing: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

impl TaskPlan {
    pub fn total(&self) -> usize {
        self.tasks.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum ImageRef<'a> {
    DeliveryPhoto { date_time: &'a str, url: &'a str },
    Thumbnail { url: &'a str },
}

impl ImageRef<'_> {
    fn url(&self) -> &str {
        match self {
            ImageRef::DeliveryPhoto { url, .. } | ImageRef::Thumbnail { url } => url,
        }
    }

    fn to_task(self, output_dir: &Path) -> Option<DownloadTask> {
        let source_url = parse_source_url(self.url())?;
        let destination_path = match self {
            ImageRef::DeliveryPhoto { date_time, .. } => {
                if date_time.trim().is_empty() {
                    return None;
                }
                let extension = last_path_segment(&source_url)
                    .and_then(dotted_extension)
                    .unwrap_or(DEFAULT_PHOTO_EXTENSION);
                output_dir
                    .join(DELIVERY_PHOTOS_DIR)
                    .join(sanitize_file_name(&format!("{date_time}{extension}")))
            }
            ImageRef::Thumbnail { .. } => {
                let basename = last_path_segment(&source_url)?;
                output_dir
                    .join(PRODUCT_THUMBNAILS_DIR)
                    .join(sanitize_file_name(basename))
            }
        };
        Some(DownloadTask {
            source_url,
            destination_path,
        })
    }
}

fn image_refs(order: &OrderRecord) -> impl Iterator<Item = ImageRef<'_>> {
    let photo = order
        .delivery_photo_url
        .as_deref()
        .map(|url| ImageRef::DeliveryPhoto {
            date_time: &order.date_time,
            url,
        });
    let thumbnails = order
        .items
        .iter()
        .filter_map(|item| item.thumbnail_url.as_deref())
        .map(|url| ImageRef::Thumbnail { url });
    photo.into_iter().chain(thumbnails)
}

fn parse_source_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

fn last_path_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.rev().find(|segment| !segment.is_empty())
}

/// Pairs of (kept, dropped) URLs whose destinations coincide.
fn url_collisions(candidates: &[DownloadTask]) -> Vec<(&Url, &Url)> {
    candidates
        .iter()
        .into_group_map_by(|task| &task.destination_path)
        .into_values()
        .flat_map(|group| {
            let kept = group[0];
            group
                .into_iter()
                .skip(1)
                .filter(move |task| task.source_url != kept.source_url)
                .map(move |task| (&kept.source_url, &task.source_url))
        })
        .collect()
}

/// Turns order records into the list of downloads still missing on disk.
///
/// Candidates are deduplicated by destination (first reference wins) and any
/// destination that already exists is left out, so re-running against the same
/// output directory only fetches what is new or was removed.
pub fn plan_tasks(orders: &[OrderRecord], output_dir: &Path) -> TaskPlan {
    let mut rejected = 0;
    let candidates = orders
        .iter()
        .flat_map(image_refs)
        .filter_map(|image| match image.to_task(output_dir) {
            Some(task) => Some(task),
            None => {
                tracing::warn!(url = image.url(), "Skipping image reference without a usable http(s) URL or name");
                rejected += 1;
                None
            }
        })
        .collect::<Vec<_>>();

    for (kept, dropped) in url_collisions(&candidates) {
        tracing::warn!(
            kept = %kept,
            dropped = %dropped,
            "Two different images map to the same file name, only the first is downloaded"
        );
    }

    let candidate_count = candidates.len();
    let unique = candidates
        .into_iter()
        .unique_by(|task| task.destination_path.clone())
        .collect::<Vec<_>>();
    let duplicates = candidate_count - unique.len();

    let (existing, tasks): (Vec<_>, Vec<_>) = unique
        .into_iter()
        .partition(|task| task.destination_path.exists());
    for task in &existing {
        tracing::trace!(output = %task.destination_path.display(), "Already downloaded, skipping");
    }

    tracing::debug!(
        pending = tasks.len(),
        skipped_existing = existing.len(),
        duplicates,
        rejected,
        "Planned downloads"
    );

    TaskPlan {
        tasks,
        skipped_existing: existing.len(),
        duplicates,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::LineItem;

    fn order(date_time: &str, photo: Option<&str>, thumbnails: &[&str]) -> OrderRecord {
        OrderRecord {
            date_time: date_time.to_string(),
            delivery_photo_url: photo.map(str::to_string),
            items: thumbnails
                .iter()
                .map(|t| LineItem {
                    thumbnail_url: Some(t.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_destinations_follow_output_layout() {
        let dir = tempfile::tempdir().unwrap();
        let orders = vec![order(
            "2024-01-30 18:23",
            Some("https://cdn.example.com/orderdeliveryphoto/abc.jpeg?w=800"),
            &["https://cdn.example.com/thumbs/Green%20Apples.png?v=2"],
        )];

        let plan = plan_tasks(&orders, dir.path());

        assert_eq!(plan.total(), 2);
        assert_eq!(
            plan.tasks[0].destination_path,
            dir.path().join("delivery_photos").join("2024-01-30_18_23.jpeg")
        );
        assert_eq!(
            plan.tasks[1].destination_path,
            dir.path().join("product_thumbnails").join("Green_20Apples.png")
        );
        assert_eq!(
            plan.tasks[1].source_url.as_str(),
            "https://cdn.example.com/thumbs/Green%20Apples.png?v=2"
        );
    }

    #[test]
    fn test_delivery_photo_without_extension_defaults_to_jpg() {
        let dir = tempfile::tempdir().unwrap();
        let orders = vec![order(
            "2024-02-01 09:05",
            Some("https://cdn.example.com/photo/12345"),
            &[],
        )];

        let plan = plan_tasks(&orders, dir.path());

        assert_eq!(
            plan.tasks[0].destination_path,
            dir.path().join("delivery_photos").join("2024-02-01_09_05.jpg")
        );
    }

    #[test]
    fn test_existing_destination_is_not_planned() {
        let dir = tempfile::tempdir().unwrap();
        let orders = vec![order(
            "2024-01-30 00:00",
            Some("https://cdn.example.com/p/1.jpg"),
            &[
                "https://cdn.example.com/t/a.png",
                "https://cdn.example.com/t/b.png",
            ],
        )];
        let thumbs = dir.path().join("product_thumbnails");
        std::fs::create_dir_all(&thumbs).unwrap();
        std::fs::write(thumbs.join("b.png"), b"already here").unwrap();

        let plan = plan_tasks(&orders, dir.path());

        assert_eq!(plan.total(), 2);
        assert_eq!(plan.skipped_existing, 1);
        assert!(
            plan.tasks
                .iter()
                .all(|t| t.destination_path != thumbs.join("b.png"))
        );
    }

    #[test]
    fn test_repeated_thumbnails_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let orders = vec![
            order("2024-01-01 10:00", None, &["https://cdn.example.com/t/milk.png"]),
            order(
                "2024-01-08 10:00",
                None,
                &[
                    "https://cdn.example.com/t/milk.png",
                    "https://cdn.example.com/t/eggs.png",
                ],
            ),
        ];

        let plan = plan_tasks(&orders, dir.path());

        assert_eq!(plan.total(), 2);
        assert_eq!(plan.duplicates, 1);
    }

    #[test]
    fn test_same_day_photos_collide_and_first_wins() {
        let dir = tempfile::tempdir().unwrap();
        let orders = vec![
            order("2024-01-30 00:00", Some("https://cdn.example.com/p/first.jpg"), &[]),
            order("2024-01-30 00:00", Some("https://cdn.example.com/p/second.jpg"), &[]),
        ];

        let plan = plan_tasks(&orders, dir.path());

        assert_eq!(plan.total(), 1);
        assert_eq!(plan.duplicates, 1);
        assert_eq!(
            plan.tasks[0].source_url.as_str(),
            "https://cdn.example.com/p/first.jpg"
        );
    }

    #[test]
    fn test_url_collisions_ignore_identical_urls() {
        let task = |url: &str, name: &str| DownloadTask {
            source_url: Url::parse(url).unwrap(),
            destination_path: Path::new("/out").join(name),
        };
        let candidates = vec![
            task("https://cdn.example.com/t/milk.png", "milk.png"),
            task("https://cdn.example.com/t/milk.png", "milk.png"),
            task("https://cdn.example.com/p/first.jpg", "day.jpg"),
            task("https://cdn.example.com/p/second.jpg", "day.jpg"),
        ];

        let collisions = url_collisions(&candidates);

        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0.as_str(), "https://cdn.example.com/p/first.jpg");
        assert_eq!(collisions[0].1.as_str(), "https://cdn.example.com/p/second.jpg");
    }

    #[test]
    fn test_unusable_references_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let orders = vec![order(
            "2024-01-01 10:00",
            Some("data:image/png;base64,AAAA"),
            &["not a url", "ftp://cdn.example.com/t/x.png", "https://cdn.example.com/"],
        )];

        let plan = plan_tasks(&orders, dir.path());

        assert!(plan.tasks.is_empty());
        assert_eq!(plan.rejected, 4);
    }
}
