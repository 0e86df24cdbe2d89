//! [OpenTopoData](https://www.opentopodata.org) elevation API client.

use super::ElevationSource;
use crate::PisteError;
use geo::geometry::Coord;
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use itertools::Itertools;
use std::time::Duration;

/// Public API endpoint.
pub const DEFAULT_URL: &str = "https://api.opentopodata.org/v1";

/// 30m SRTM, which covers every ski area between 60°N and 56°S.
pub const DEFAULT_DATASET: &str = "srtm30m";

/// Most locations the public API accepts per request.
pub const MAX_LOCATIONS: usize = 100;

/// The public API allows one request per second.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<Sample>,
}

#[derive(Debug, Deserialize)]
struct Sample {
    elevation: Option<f64>,
}

/// Makes one request per call; wrap in [`super::Batched`] and
/// [`super::RateLimited`] to respect the service's limits.
pub struct OpenTopoData {
    client: Client,
    url: String,
}

impl OpenTopoData {
    pub fn new(base_url: &str, dataset: &str) -> Result<Self, PisteError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let url = format!("{}/{}", base_url.trim_end_matches('/'), dataset);
        Ok(Self { client, url })
    }
}

impl ElevationSource for OpenTopoData {
    fn elevations(&mut self, coords: &[Coord<f64>]) -> Result<Vec<f64>, PisteError> {
        if coords.is_empty() {
            return Ok(Vec::new());
        }
        debug!("requesting {} elevations from {}", coords.len(), self.url);
        let response: Response = self
            .client
            .get(&self.url)
            .query(&[("locations", locations(coords))])
            .send()?
            .error_for_status()?
            .json()?;

        if response.status != "OK" {
            return Err(PisteError::Elevation(
                response.error.unwrap_or(response.status),
            ));
        }

        response
            .results
            .into_iter()
            .zip(coords)
            .map(|(sample, coord)| {
                sample.elevation.ok_or_else(|| {
                    PisteError::Elevation(format!("no elevation data at {coord:?}"))
                })
            })
            .collect()
    }
}

/// Formats `coords` as `lat,lon|lat,lon|...`.
fn locations(coords: &[Coord<f64>]) -> String {
    coords
        .iter()
        .map(|Coord { x, y }| format!("{y},{x}"))
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::{locations, Response};
    use geo::coord;

    #[test]
    fn test_locations() {
        let coords = [coord!(x: -71.30325, y: 44.2705), coord!(x: 6.865, y: 45.8326)];
        assert_eq!(locations(&coords), "44.2705,-71.30325|45.8326,6.865");
    }

    #[test]
    fn test_decode_response() {
        let body = r#"{
            "results": [
                {"dataset": "srtm30m", "elevation": 1903.0, "location": {"lat": 44.2705, "lng": -71.30325}},
                {"dataset": "srtm30m", "elevation": null, "location": {"lat": 0.0, "lng": 0.0}}
            ],
            "status": "OK"
        }"#;
        let response: Response = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.results[0].elevation, Some(1903.0));
        assert_eq!(response.results[1].elevation, None);

        let error: Response =
            serde_json::from_str(r#"{"error": "Too many locations", "status": "INVALID_REQUEST"}"#)
                .unwrap();
        assert_eq!(error.error.as_deref(), Some("Too many locations"));
        assert!(error.results.is_empty());
    }
}
