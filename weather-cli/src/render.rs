//! Terminal rendering of an `AppResult`.

use std::fmt::Write as _;

use weather_now_core::{AppResult, ResolvedCity, WeatherSnapshot};

pub fn text(result: &AppResult) -> String {
    match result {
        AppResult::Idle => "Enter a city name to get started.".to_string(),
        AppResult::Loading => "Fetching weather data...".to_string(),
        AppResult::Success { city, weather } => card(city, weather),
        AppResult::Error { message } => format!("⚠️  {message}"),
    }
}

/// JSON view of the result. Successful results also carry the description and icon.
pub fn json(result: &AppResult) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(result)?;

    if let (AppResult::Success { weather, .. }, Some(obj)) = (result, value.as_object_mut()) {
        obj.insert("description".into(), weather.description().into());
        obj.insert("icon".into(), weather.icon().as_str().into());
    }

    Ok(serde_json::to_string_pretty(&value)?)
}

fn card(city: &ResolvedCity, weather: &WeatherSnapshot) -> String {
    let temperature = round_half_up(weather.temperature_c);
    let mut out = String::new();

    let _ = writeln!(out, "{}", city.name);
    if !city.country.is_empty() {
        let _ = writeln!(out, "{}", city.country);
    }
    let _ = writeln!(out, "{}", weather.time.format("%A, %B %-d, %Y"));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}  {temperature}°C", weather.icon().glyph());
    let _ = writeln!(out, "{}", weather.description());
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<12} {} km/h", "Wind speed", weather.wind_speed_kmh);
    if let Some(humidity) = weather.humidity_percent {
        let _ = writeln!(out, "{:<12} {humidity}%", "Humidity");
    }
    let _ = writeln!(out, "{:<12} {temperature}°C", "Feels like");
    let _ = write!(out, "{:<12} {}", "Time of day", if weather.is_day { "Day" } else { "Night" });

    out
}

/// Rounds .5 towards positive infinity, so -2.5 shows as -2.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
