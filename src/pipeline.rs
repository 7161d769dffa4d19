use crate::config::Config;
use crate::dataset::Dataset;
use crate::mapbox::{self, TileSource};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

/// Outcome of one run over the dataset.
#[derive(Deserialize, Serialize, Debug, Default, PartialEq)]
pub struct RunReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cap_reached: bool,
}

impl RunReport {
    #[allow(dead_code)]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&content)?;
        Ok(report)
    }

    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// One sequential pass over the dataset: skip images that already exist,
/// fetch the rest, stop once `max_images` new downloads have succeeded.
pub async fn run(
    config: &Config,
    dataset: &Dataset,
    source: &impl TileSource,
) -> Result<RunReport> {
    fs::create_dir_all(&config.image_dir)?;

    let mut report = RunReport::default();

    for record in dataset.records() {
        if report.downloaded >= config.max_images {
            println!("Reached max_images limit. Stopping.");
            report.cap_reached = true;
            break;
        }

        let image_path = config.image_path(&record.id);

        // Idempotency: an existing file is proof the work is already done
        if image_path.exists() {
            report.skipped += 1;
            continue;
        }

        let url = mapbox::build_static_image_url(
            &config.style,
            config.zoom,
            &config.image_size,
            record.lat,
            record.long,
            config.token(),
        );

        match fetch_and_save(source, &url, &image_path).await {
            Ok(()) => report.downloaded += 1,
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("Failed to download image for property ID {}", record.id);
                report.failed += 1;
            }
        }

        sleep(Duration::from_millis(config.request_delay_ms)).await;
    }

    Ok(report)
}

/// Fetch one image and persist it. A write error after a successful
/// response is reported the same way as a fetch failure.
async fn fetch_and_save(source: &impl TileSource, url: &str, path: &Path) -> Result<()> {
    let body = source.fetch_image(url).await?;
    fs::write(path, body)?;
    Ok(())
}
