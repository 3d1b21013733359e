use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Stage, WeatherError},
    model::WeatherSnapshot,
};

use super::{ForecastSource, get_body, parse_body};

const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";

/// Open-Meteo forecast: current conditions plus an hourly series, in the location's timezone.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    url: String,
    http: Client,
}

impl OpenMeteoForecast {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self { url: url.into(), http }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    time: String,
    temperature: f64,
    windspeed: f64,
    weathercode: i32,
    is_day: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: OmCurrentWeather,
    #[serde(default)]
    hourly: OmHourly,
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(WeatherError::retrieval(
                Stage::Forecast,
                format!("Invalid coordinates ({lat}, {lon})"),
            ));
        }

        let query = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("current_weather", "true".to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ];

        let body =
            get_body(&self.http, &self.url, &query, Stage::Forecast, "Failed to fetch weather data")
                .await?;

        let parsed: OmForecastResponse = parse_body(&body, Stage::Forecast)?;
        let current = parsed.current_weather;

        let time = parse_local_time(&current.time).ok_or_else(|| {
            WeatherError::retrieval(
                Stage::Forecast,
                format!("Unexpected timestamp '{}'", current.time),
            )
        })?;

        let humidity_percent = humidity_at(&parsed.hourly, time);
        if humidity_percent.is_none() {
            tracing::debug!(%time, "no hourly humidity for current conditions");
        }

        Ok(WeatherSnapshot {
            time,
            temperature_c: current.temperature,
            wind_speed_kmh: current.windspeed,
            weather_code: current.weathercode,
            is_day: current.is_day == 1,
            humidity_percent,
        })
    }
}

/// Open-Meteo sends local times as `2024-01-15T14:00`, occasionally with seconds.
pub fn parse_local_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Humidity from the first hourly entry sharing `at`'s hour of day and day of month.
///
/// Only hour and day-of-month are compared, so entries a month apart can match.
fn humidity_at(hourly: &OmHourly, at: NaiveDateTime) -> Option<f64> {
    let idx = hourly.time.iter().position(|raw| {
        parse_local_time(raw).is_some_and(|t| t.hour() == at.hour() && t.day() == at.day())
    })?;

    hourly.relative_humidity_2m.get(idx).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(h, min, 0)).unwrap()
    }

    fn hourly(times: &[&str], humidity: &[Option<f64>]) -> OmHourly {
        OmHourly {
            time: times.iter().map(|t| t.to_string()).collect(),
            relative_humidity_2m: humidity.to_vec(),
        }
    }

    #[test]
    fn parses_minutes_and_seconds_forms() {
        assert_eq!(parse_local_time("2024-01-15T14:00"), Some(at(2024, 1, 15, 14, 0)));
        assert_eq!(parse_local_time("2024-01-15T14:30:00"), Some(at(2024, 1, 15, 14, 30)));
        assert_eq!(parse_local_time("yesterday"), None);
    }

    #[test]
    fn matches_same_hour_and_day_ignoring_minutes() {
        let series = hourly(
            &["2024-01-15T13:00", "2024-01-15T14:00", "2024-01-15T15:00"],
            &[Some(70.0), Some(65.0), Some(60.0)],
        );
        assert_eq!(humidity_at(&series, at(2024, 1, 15, 14, 45)), Some(65.0));
    }

    #[test]
    fn no_match_yields_none() {
        let series = hourly(&["2024-01-15T13:00"], &[Some(70.0)]);
        assert_eq!(humidity_at(&series, at(2024, 1, 16, 13, 0)), None);
        assert_eq!(humidity_at(&OmHourly::default(), at(2024, 1, 16, 13, 0)), None);
    }

    #[test]
    fn first_match_wins_across_months() {
        let series = hourly(
            &["2024-01-15T14:00", "2024-02-15T14:00"],
            &[Some(40.0), Some(90.0)],
        );
        assert_eq!(humidity_at(&series, at(2024, 2, 15, 14, 0)), Some(40.0));
    }

    #[test]
    fn null_or_missing_humidity_is_none() {
        let series = hourly(&["2024-01-15T14:00", "2024-01-15T15:00"], &[None]);
        assert_eq!(humidity_at(&series, at(2024, 1, 15, 14, 0)), None);
        assert_eq!(humidity_at(&series, at(2024, 1, 15, 15, 0)), None);
    }

    #[test]
    fn unparseable_hourly_entries_are_skipped() {
        let series = hourly(&["garbage", "2024-01-15T14:00"], &[Some(1.0), Some(2.0)]);
        assert_eq!(humidity_at(&series, at(2024, 1, 15, 14, 0)), Some(2.0));
    }
}
