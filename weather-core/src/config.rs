use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::locate::{Coordinates, PermissionState};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Base URLs of the three upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub ip_lookup_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

/// Device location settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// When false, the "use my location" flow reports geolocation as unsupported.
    pub enabled: bool,

    /// Advisory permission state reported by the permission probe.
    pub permission: Option<PermissionState>,

    /// Example TOML:
    /// [geolocation]
    /// latitude = 52.52
    /// longitude = 13.41
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self { enabled: true, permission: None, latitude: None, longitude: None }
    }
}

impl GeolocationConfig {
    /// Configured device position, if both halves are present.
    pub fn fixed_position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }

    pub fn set_position(&mut self, coords: Coordinates) {
        self.latitude = Some(coords.latitude);
        self.longitude = Some(coords.longitude);
    }

    pub fn clear_position(&mut self) {
        self.latitude = None;
        self.longitude = None;
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub request_timeout_secs: u64,
    pub endpoints: Endpoints,
    pub geolocation: GeolocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            endpoints: Endpoints::default(),
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-now", "weather-now")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = Config::from_toml("").expect("empty config must parse");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.endpoints.forecast_url, DEFAULT_FORECAST_URL);
        assert!(cfg.geolocation.enabled);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [geolocation]
            permission = "denied"
            latitude = 48.85
            longitude = 2.35

            [endpoints]
            ip_lookup_url = "http://localhost:9000/json"
            "#,
        )
        .expect("config must parse");

        assert!(cfg.geolocation.enabled);
        assert_eq!(cfg.geolocation.permission, Some(PermissionState::Denied));
        assert_eq!(
            cfg.geolocation.fixed_position(),
            Some(Coordinates { latitude: 48.85, longitude: 2.35 })
        );
        assert_eq!(cfg.endpoints.ip_lookup_url, "http://localhost:9000/json");
        assert_eq!(cfg.endpoints.geocoding_url, DEFAULT_GEOCODING_URL);
    }

    #[test]
    fn half_a_position_is_no_position() {
        let mut geo = GeolocationConfig { latitude: Some(1.0), ..GeolocationConfig::default() };
        assert_eq!(geo.fixed_position(), None);

        geo.set_position(Coordinates { latitude: 3.0, longitude: 4.0 });
        assert!(geo.fixed_position().is_some());

        geo.clear_position();
        assert_eq!(geo.fixed_position(), None);
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let mut cfg = Config::default();
        cfg.geolocation.enabled = false;
        cfg.request_timeout_secs = 3;

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back = Config::from_toml(&text).expect("parse");
        assert_eq!(back, cfg);
    }
}
