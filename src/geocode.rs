use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = "job_autopilot/0.1 (location lookup)";

/// A place returned by a geocoding service. Only used for display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

/// Best-effort free-text place lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<GeoPlace>>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    async fn lookup(&self, query: &str) -> Result<Option<GeoPlace>> {
        (**self).lookup(query).await
    }
}

/// OpenStreetMap Nominatim search endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(NOMINATIM_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create geocoding HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<GeoPlace>> {
        debug!("Geocoding '{}'", query);

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("Geocoding request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Geocoding service returned {}", response.status());
        }

        let places: Vec<GeoPlace> = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        Ok(places.into_iter().next())
    }
}

/// Geocoder that never finds anything. Keeps lookups offline.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeocoder;

#[async_trait]
impl Geocoder for NoGeocoder {
    async fn lookup(&self, _query: &str) -> Result<Option<GeoPlace>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_payload() {
        let body = r#"[{"place_id":1,"display_name":"Lagos, Nigeria","lat":"6.45","lon":"3.39","type":"city"}]"#;
        let places: Vec<GeoPlace> = serde_json::from_str(body).unwrap();
        assert_eq!(places[0].display_name, "Lagos, Nigeria");
        assert_eq!(places[0].lat, "6.45");
    }

    #[tokio::test]
    async fn no_geocoder_finds_nothing() {
        assert_eq!(NoGeocoder.lookup("anywhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let geocoder =
            NominatimGeocoder::with_base_url("http://127.0.0.1:9", Duration::from_millis(500))
                .unwrap();
        assert!(geocoder.lookup("atlantis").await.is_err());
    }
}
