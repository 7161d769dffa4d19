//! Mapbox Static Images API: URL construction and the tile fetch seam.
use anyhow::Result;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const STATIC_IMAGES_API: &str = "https://api.mapbox.com/styles/v1/mapbox";

/// Per-request timeout. There is no timeout on the run as a whole.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("Failed request with status code {0}")]
    Status(StatusCode),
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Build a Static Images API URL for the given coordinates. Pure and
/// deterministic; the service expects longitude before latitude.
pub fn build_static_image_url(
    style: &str,
    zoom: u8,
    image_size: &str,
    lat: f64,
    long: f64,
    token: &str,
) -> String {
    let mut url = Url::parse(&format!(
        "{STATIC_IMAGES_API}/{style}/static/{long},{lat},{zoom}/{image_size}"
    ))
    .expect("static image url is well-formed");
    url.query_pairs_mut().append_pair("access_token", token);
    url.to_string()
}

pub trait TileSource {
    /// Fetch one image, returning the raw body bytes on HTTP 200.
    async fn fetch_image(self: &Self, url: &str) -> Result<Vec<u8>, FetchFailure>;
}

pub struct MapboxClient {
    client: reqwest::Client,
}

impl MapboxClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl TileSource for MapboxClient {
    async fn fetch_image(self: &Self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(FetchFailure::Status(response.status()));
        }
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_contains_all_request_parameters() {
        let url = build_static_image_url("satellite-v9", 18, "256x256", 45.5231, -122.6765, "pk.abc123");
        assert!(url.starts_with("https://api.mapbox.com/styles/v1/mapbox/satellite-v9/static/"));
        assert!(url.contains("/-122.6765,45.5231,18/"));
        assert!(url.contains("/256x256?"));
        assert!(url.ends_with("access_token=pk.abc123"));
    }

    #[test]
    fn test_url_embeds_exact_coordinates_over_range() {
        let latitudes = [-89.9, -45.0, 0.0, 0.5, 45.5231, 89.9];
        let longitudes = [-179.9, -122.6765, -0.25, 0.0, 90.0, 179.9];
        for &lat in latitudes.iter() {
            for &long in longitudes.iter() {
                let url = build_static_image_url("satellite-v9", 18, "256x256", lat, long, "tok");
                let parsed = Url::parse(&url).unwrap();
                assert!(parsed.path().contains(&format!("/{},{},18/", long, lat)));
                let token = parsed
                    .query_pairs()
                    .find(|(key, _)| key == "access_token")
                    .map(|(_, value)| value.to_string());
                assert_eq!(token.as_deref(), Some("tok"));
            }
        }
    }

    #[test]
    fn test_url_is_deterministic() {
        let a = build_static_image_url("satellite-v9", 12, "512x512", 1.25, 2.5, "tok");
        let b = build_static_image_url("satellite-v9", 12, "512x512", 1.25, 2.5, "tok");
        assert_eq!(a, b);
        assert!(a.contains("/2.5,1.25,12/512x512?"));
    }
}
