use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{Stage, WeatherError},
    model::ApproximateLocation,
};

use super::{IpLocator, get_body, parse_body};

/// ipapi.co style lookup of the caller's public IP.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    url: String,
    http: Client,
}

impl IpApiLocator {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self { url: url.into(), http }
    }
}

// Coordinates are kept as raw JSON so that strings or nulls are rejected here
// instead of failing the whole decode.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<Value>,
    longitude: Option<Value>,
    city: Option<String>,
    country_name: Option<String>,
    region: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpApiResponse {
    fn into_location(self) -> Result<ApproximateLocation, WeatherError> {
        if self.error {
            let reason = self.reason.unwrap_or_else(|| "IP lookup refused".to_string());
            return Err(WeatherError::not_found(Stage::IpLookup, reason));
        }

        let latitude = self.latitude.as_ref().and_then(Value::as_f64);
        let longitude = self.longitude.as_ref().and_then(Value::as_f64);

        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Err(WeatherError::not_found(Stage::IpLookup, "IP location not available"));
        };

        Ok(ApproximateLocation {
            latitude,
            longitude,
            city: self.city.filter(|c| !c.is_empty()),
            country: self.country_name.filter(|c| !c.is_empty()),
            region: self.region.filter(|r| !r.is_empty()),
        })
    }
}

#[async_trait]
impl IpLocator for IpApiLocator {
    async fn locate(&self) -> Result<ApproximateLocation, WeatherError> {
        let body = get_body(&self.http, &self.url, &[], Stage::IpLookup, "IP lookup failed").await?;
        let parsed: IpApiResponse = parse_body(&body, Stage::IpLookup)?;
        let location = parsed.into_location()?;

        tracing::info!(
            lat = location.latitude,
            lon = location.longitude,
            city = location.city.as_deref().unwrap_or("-"),
            "approximate location resolved"
        );

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: serde_json::Value) -> Result<ApproximateLocation, WeatherError> {
        serde_json::from_value::<IpApiResponse>(json).unwrap().into_location()
    }

    #[test]
    fn numeric_coordinates_are_accepted() {
        let loc = decode(serde_json::json!({
            "latitude": 48.85,
            "longitude": 2.35,
            "city": "Paris",
            "country_name": "France",
            "region": "Île-de-France"
        }))
        .unwrap();

        assert_eq!(loc.city.as_deref(), Some("Paris"));
        assert_eq!(loc.country.as_deref(), Some("France"));
        assert_eq!(loc.region.as_deref(), Some("Île-de-France"));
    }

    #[test]
    fn string_coordinates_are_rejected() {
        let err = decode(serde_json::json!({ "latitude": "48.85", "longitude": 2.35 })).unwrap_err();
        assert!(matches!(err, WeatherError::NotFound { stage: Stage::IpLookup, .. }));
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        let err = decode(serde_json::json!({ "city": "Paris" })).unwrap_err();
        assert!(err.to_string().contains("IP location not available"));
    }

    #[test]
    fn provider_error_flag_surfaces_reason() {
        let err = decode(serde_json::json!({ "error": true, "reason": "RateLimited" })).unwrap_err();
        assert!(err.to_string().ends_with("RateLimited"));
    }

    #[test]
    fn empty_strings_become_absent() {
        let loc = decode(serde_json::json!({
            "latitude": 1.0, "longitude": 2.0, "city": "", "country_name": "", "region": ""
        }))
        .unwrap();
        assert_eq!(loc.city, None);
        assert_eq!(loc.country, None);
        assert_eq!(loc.region, None);
    }
}
