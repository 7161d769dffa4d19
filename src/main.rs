use anyhow::Result;
use clap::Parser;
use satfetch::config::Config;
use satfetch::dataset::Dataset;
use satfetch::mapbox::MapboxClient;
use satfetch::pipeline;
use std::path::PathBuf;

/// Fetch one satellite image per property from the Mapbox Static Images API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Optional TOML settings file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV with id, lat and long columns.
    #[arg(long)]
    data_csv: Option<PathBuf>,

    /// Directory where images are written.
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Delay between requests, in milliseconds.
    #[arg(long)]
    request_delay_ms: Option<u64>,

    /// Hard cap on successful downloads this run.
    #[arg(long)]
    max_images: Option<usize>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::read(path)?,
            None => Config::from_env()?,
        };
        if let Some(data_csv) = self.data_csv {
            config.data_csv = data_csv;
        }
        if let Some(image_dir) = self.image_dir {
            config.image_dir = image_dir;
        }
        if let Some(request_delay_ms) = self.request_delay_ms {
            config.request_delay_ms = request_delay_ms;
        }
        if let Some(max_images) = self.max_images {
            config.max_images = max_images;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.into_config()?;

    println!("Starting satellite image fetching pipeline...");
    println!("Reading data from: {}", config.data_csv.display());
    println!("Images will be saved to: {}", config.image_dir.display());

    let dataset = Dataset::read(&config.data_csv)?;
    println!("Removed {} duplicate property IDs", dataset.duplicates_removed());
    if let Some(summary) = dataset.summary() {
        println!("Total rows in image subset: {}", summary.total);
        println!("Latitude range: {} to {}", summary.lat_min, summary.lat_max);
        println!("Longitude range: {} to {}", summary.long_min, summary.long_max);
    }
    println!("Data validation complete.");

    let client = MapboxClient::new()?;

    println!("Starting image download...");
    let report = pipeline::run(&config, &dataset, &client).await?;
    report.write(config.image_dir.join("run_report.json"))?;

    println!(
        "Image download completed. Total images downloaded: {}",
        report.downloaded
    );

    Ok(())
}
