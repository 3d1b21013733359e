use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::{
    Config,
    error::{Stage, WeatherError},
    model::{ApproximateLocation, ResolvedCity, WeatherSnapshot},
    provider::{forecast::OpenMeteoForecast, geocoding::OpenMeteoGeocoder, ip_lookup::IpApiLocator},
};

pub mod forecast;
pub mod geocoding;
pub mod ip_lookup;

/// Resolves a place name to its best match.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// `name` is expected to be trimmed and non-empty.
    async fn resolve_city(&self, name: &str) -> Result<ResolvedCity, WeatherError>;
}

/// Current conditions for a coordinate pair.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError>;
}

/// Coarse position of this machine derived from its public IP address.
#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<ApproximateLocation, WeatherError>;
}

/// The three network-backed collaborators of the orchestrator.
#[derive(Debug)]
pub struct Providers {
    pub geocoder: Box<dyn Geocoder>,
    pub forecast: Box<dyn ForecastSource>,
    pub ip_locator: Box<dyn IpLocator>,
}

impl Providers {
    /// Construct the Open-Meteo and ipapi clients from config, sharing one HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = http_client(config)?;
        let endpoints = &config.endpoints;

        Ok(Self {
            geocoder: Box::new(OpenMeteoGeocoder::new(&endpoints.geocoding_url, http.clone())),
            forecast: Box::new(OpenMeteoForecast::new(&endpoints.forecast_url, http.clone())),
            ip_locator: Box::new(IpApiLocator::new(&endpoints.ip_lookup_url, http)),
        })
    }
}

pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("weather-now/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and return the body of a successful response.
///
/// Transport failures and non-success statuses become `Retrieval` errors for `stage`;
/// `failure` is the reason used for a bad status.
async fn get_body(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
    stage: Stage,
    failure: &str,
) -> Result<String, WeatherError> {
    tracing::debug!(%url, ?query, "{}", stage_label(stage));

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| WeatherError::retrieval(stage, e.to_string()))?;

    let status = res.status();
    let body = res.text().await.map_err(|e| WeatherError::retrieval(stage, e.to_string()))?;

    if !status.is_success() {
        tracing::debug!(%status, body = %truncate_body(&body), "upstream rejected request");
        return Err(WeatherError::retrieval(stage, format!("{failure} (status {status})")));
    }

    Ok(body)
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str, stage: Stage) -> Result<T, WeatherError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!(body = %truncate_body(body), "undecodable response");
        WeatherError::retrieval(stage, format!("Unexpected response: {e}"))
    })
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Geocoding => "geocoding request",
        Stage::Forecast => "forecast request",
        Stage::IpLookup => "ip lookup request",
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_all_clients() {
        let providers = Providers::from_config(&Config::default());
        assert!(providers.is_ok());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let short = truncate_body(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);

        assert_eq!(truncate_body("ok"), "ok");
    }

    #[test]
    fn parse_body_reports_stage() {
        let err = parse_body::<serde_json::Value>("not json", Stage::Forecast).unwrap_err();
        assert!(err.to_string().starts_with("Error fetching weather data: Unexpected response"));
    }
}
