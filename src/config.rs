use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml;

/// Environment variable holding the Mapbox access credential.
pub const TOKEN_VAR: &str = "MAPBOX_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{TOKEN_VAR} not found. Please set it in your environment.")]
    MissingToken,
}

/// Run configuration, constructed once at startup and passed by reference.
///
/// The access token is only ever read from the environment; the settings
/// file and CLI flags cover the non-secret fields.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    /// Input CSV with one row per property.
    pub data_csv: PathBuf,
    /// Directory where fetched images are written.
    pub image_dir: PathBuf,
    /// Mapbox style identifier.
    pub style: String,
    /// Static image zoom level.
    pub zoom: u8,
    /// Output image size, e.g. "256x256".
    pub image_size: String,
    /// Fixed delay between requests, in milliseconds.
    pub request_delay_ms: u64,
    /// Hard cap on successful downloads in a single run.
    pub max_images: usize,
    #[serde(skip)]
    token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_csv: PathBuf::from("data/processed/train_with_images.csv"),
            image_dir: PathBuf::from("data/images"),
            style: "satellite-v9".to_string(),
            zoom: 18,
            image_size: "256x256".to_string(),
            request_delay_ms: 100,
            max_images: 6000,
            token: String::new(),
        }
    }
}

impl Config {
    /// Default settings plus the token from the environment. Fails fast
    /// with a typed error when the token is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.token = read_token()?;
        Ok(config)
    }

    /// Read settings from a TOML file, then pick up the token from the
    /// environment.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.token = read_token()?;
        Ok(config)
    }

    #[allow(dead_code)]
    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn token(self: &Self) -> &str {
        &self.token
    }

    /// Destination path for a property's image, keyed by id.
    pub fn image_path(self: &Self, property_id: &str) -> PathBuf {
        self.image_dir.join(format!("{}.png", property_id))
    }
}

fn read_token() -> Result<String, ConfigError> {
    match env::var(TOKEN_VAR) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(ConfigError::MissingToken),
    }
}
