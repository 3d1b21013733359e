use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Stage, WeatherError},
    model::ResolvedCity,
};

use super::{Geocoder, get_body, parse_body};

/// Open-Meteo geocoding search, top match only.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    url: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self { url: url.into(), http }
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    /// First-level administrative area (state, province, region).
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    // Omitted entirely when nothing matched.
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn resolve_city(&self, name: &str) -> Result<ResolvedCity, WeatherError> {
        let query = [
            ("name", name.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let body = get_body(
            &self.http,
            &self.url,
            &query,
            Stage::Geocoding,
            "Failed to fetch city coordinates",
        )
        .await?;

        let parsed: GeoResponse = parse_body(&body, Stage::Geocoding)?;

        let city = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::not_found(Stage::Geocoding, "City not found"))?;

        tracing::info!(
            query = name,
            city = %city.name,
            lat = city.latitude,
            lon = city.longitude,
            "resolved city"
        );

        Ok(ResolvedCity {
            name: city.name,
            country: city.country.unwrap_or_default(),
            state: city.admin1.unwrap_or_default(),
            latitude: city.latitude,
            longitude: city.longitude,
        })
    }
}
