use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    condition::{self, Icon},
    locate::Coordinates,
};

/// Name given to a city synthesized from the device position.
pub const CURRENT_LOCATION: &str = "Current Location";
/// Name used for an IP-based position without a city.
pub const APPROX_LOCATION: &str = "Approx. Location";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    Search(String),
    CurrentLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCity {
    pub name: String,
    pub country: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ResolvedCity {
    /// City for a position reported by the device itself.
    pub fn current_location(coords: Coordinates) -> Self {
        Self {
            name: CURRENT_LOCATION.to_string(),
            country: String::new(),
            state: String::new(),
            latitude: coords.latitude,
            longitude: coords.longitude,
        }
    }
}

/// Coarse position reported by the IP lookup, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximateLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

impl From<ApproximateLocation> for ResolvedCity {
    fn from(loc: ApproximateLocation) -> Self {
        let name = match loc.city.filter(|c| !c.is_empty()) {
            Some(city) => format!("{city} (Approx.)"),
            None => APPROX_LOCATION.to_string(),
        };

        Self {
            name,
            country: loc.country.unwrap_or_default(),
            state: loc.region.unwrap_or_default(),
            latitude: loc.latitude,
            longitude: loc.longitude,
        }
    }
}

/// Current conditions at a location, in the location's local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
    pub is_day: bool,
    pub humidity_percent: Option<f64>,
}

impl WeatherSnapshot {
    pub fn description(&self) -> &'static str {
        condition::describe(self.weather_code)
    }

    pub fn icon(&self) -> Icon {
        condition::icon_for(self.weather_code, self.is_day)
    }
}

/// The single status slot shown to the user. Exactly one variant holds at a time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AppResult {
    #[default]
    Idle,
    Loading,
    Success {
        city: ResolvedCity,
        weather: WeatherSnapshot,
    },
    Error {
        message: String,
    },
}

impl AppResult {
    pub fn status(&self) -> &'static str {
        match self {
            AppResult::Idle => "idle",
            AppResult::Loading => "loading",
            AppResult::Success { .. } => "success",
            AppResult::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AppResult::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AppResult::Error { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn approx(city: Option<&str>) -> ApproximateLocation {
        ApproximateLocation {
            latitude: 48.85,
            longitude: 2.35,
            city: city.map(str::to_string),
            country: Some("France".into()),
            region: Some("Île-de-France".into()),
        }
    }

    #[test]
    fn current_location_city_has_empty_country_and_state() {
        let city = ResolvedCity::current_location(Coordinates { latitude: 1.5, longitude: -2.5 });
        assert_eq!(city.name, "Current Location");
        assert_eq!(city.country, "");
        assert_eq!(city.state, "");
        assert_eq!((city.latitude, city.longitude), (1.5, -2.5));
    }

    #[test]
    fn approximate_city_is_labelled() {
        let city = ResolvedCity::from(approx(Some("Paris")));
        assert_eq!(
            city,
            ResolvedCity {
                name: "Paris (Approx.)".into(),
                country: "France".into(),
                state: "Île-de-France".into(),
                latitude: 48.85,
                longitude: 2.35,
            }
        );
    }

    #[test]
    fn approximate_without_city() {
        assert_eq!(ResolvedCity::from(approx(None)).name, APPROX_LOCATION);
        assert_eq!(ResolvedCity::from(approx(Some(""))).name, APPROX_LOCATION);

        let bare = ApproximateLocation { country: None, region: None, ..approx(None) };
        let city = ResolvedCity::from(bare);
        assert_eq!(city.country, "");
        assert_eq!(city.state, "");
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let json = serde_json::to_value(AppResult::Error { message: "boom".into() }).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "error", "message": "boom" }));

        let json = serde_json::to_value(AppResult::Loading).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "loading" }));
    }

    #[test]
    fn snapshot_classifies_itself() {
        let snapshot = WeatherSnapshot {
            time: NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(22, 0, 0))
                .unwrap(),
            temperature_c: 4.2,
            wind_speed_kmh: 11.0,
            weather_code: 0,
            is_day: false,
            humidity_percent: None,
        };
        assert_eq!(snapshot.description(), "Clear sky");
        assert_eq!(snapshot.icon(), Icon::Moon);
    }
}
