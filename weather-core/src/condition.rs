//! Mapping from WMO weather codes (as reported by Open-Meteo) to text and icons.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::Serialize;

/// Fallback phrase for codes outside the WMO table.
pub const UNKNOWN_CONDITION: &str = "Unknown weather condition";

/// Human-readable description of a weather code.
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_CONDITION,
    }
}

/// Icon shown next to the current conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Sun,
    Moon,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    RainShowers,
    Storm,
    Default,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Sun => "sun",
            Icon::Moon => "moon",
            Icon::PartlyCloudy => "partly_cloudy",
            Icon::Fog => "fog",
            Icon::Drizzle => "drizzle",
            Icon::Rain => "rain",
            Icon::Snow => "snow",
            Icon::RainShowers => "rain_showers",
            Icon::Storm => "storm",
            Icon::Default => "default",
        }
    }

    /// Emoji rendering for terminals.
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sun => "☀️",
            Icon::Moon => "🌙",
            Icon::PartlyCloudy => "⛅",
            Icon::Fog => "🌫️",
            Icon::Drizzle => "🌦️",
            Icon::Rain | Icon::RainShowers => "🌧️",
            Icon::Snow => "❄️",
            Icon::Storm => "⛈️",
            Icon::Default => "🌤️",
        }
    }
}

impl std::fmt::Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon for a weather code. Clear and partly cloudy skies switch to the moon at night.
pub fn icon_for(code: i32, is_day: bool) -> Icon {
    match code {
        0 if is_day => Icon::Sun,
        1..=3 if is_day => Icon::PartlyCloudy,
        0..=3 => Icon::Moon,
        45 | 48 => Icon::Fog,
        51..=57 => Icon::Drizzle,
        61..=67 => Icon::Rain,
        71..=77 => Icon::Snow,
        80..=86 => Icon::RainShowers,
        95..=99 => Icon::Storm,
        _ => Icon::Default,
    }
}
