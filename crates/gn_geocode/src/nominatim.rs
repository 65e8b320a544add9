use std::fmt;

use async_trait::async_trait;
use gn_core::{Coordinates, Error, Geocoder, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
}

/// Geocoder for Nominatim-style `/search?format=json&q=` endpoints.
pub struct NominatimGeocoder {
    client: Client,
    base_url: Url,
}

impl fmt::Debug for NominatimGeocoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NominatimGeocoder")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client, base_url })
    }

    fn search_url(&self, location: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", location);
        url
    }
}

fn parse_candidate(candidate: &Candidate) -> Result<Coordinates> {
    let lat = candidate
        .lat
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::Geocode(format!("invalid latitude {:?}: {}", candidate.lat, e)))?;
    let lon = candidate
        .lon
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::Geocode(format!("invalid longitude {:?}: {}", candidate.lon, e)))?;
    Ok(Coordinates { lat, lon })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "Nominatim"
    }

    async fn try_resolve(&self, location: &str) -> Result<Option<Coordinates>> {
        tracing::info!("🧭 Geocoding location: {}...", location);
        let response = self
            .client
            .get(self.search_url(location))
            .send()
            .await?
            .error_for_status()?;
        let candidates: Vec<Candidate> = response.json().await?;

        match candidates.first() {
            Some(candidate) => {
                let coordinates = parse_candidate(candidate)?;
                tracing::info!("📍 Geocoded {} to [{}, {}]", location, coordinates.lat, coordinates.lon);
                Ok(Some(coordinates))
            }
            None => {
                tracing::info!("🤷 No geocode found for {}.", location);
                Ok(None)
            }
        }
    }
}
