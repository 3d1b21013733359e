//! Device geolocation and the consent prompt used before falling back to IP lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::config::GeolocationConfig;

/// Question asked before using the coarse IP-based position.
pub const APPROXIMATE_PROMPT: &str =
    "Precise location was blocked or timed out. Use approximate location via your IP instead?";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Options passed along with a position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position accepted. Zero means always take a fresh reading.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(20_000),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("position request timed out")]
    Timeout,
    #[error("position request failed: {0}")]
    Other(String),
}

/// Platform capability that reports where the device is.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Whether the capability exists at all.
    fn is_supported(&self) -> bool;

    /// Best-effort permission probe. `Ok(None)` means the platform cannot tell.
    async fn permission(&self) -> anyhow::Result<Option<PermissionState>> {
        Ok(None)
    }

    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionError>;
}

/// Asks the user whether the approximate IP-based position may be used.
#[async_trait]
pub trait ConsentPrompt: Send + Sync + Debug {
    async fn allow_approximate(&self, question: &str) -> anyhow::Result<bool>;
}

/// Geolocator backed by the user's configuration: the "device" is wherever
/// `geolocation.latitude`/`longitude` say it is.
#[derive(Debug, Clone)]
pub struct ConfiguredGeolocator {
    enabled: bool,
    permission: Option<PermissionState>,
    position: Option<Coordinates>,
}

impl ConfiguredGeolocator {
    pub fn new(config: &GeolocationConfig) -> Self {
        Self {
            enabled: config.enabled,
            permission: config.permission,
            position: config.fixed_position(),
        }
    }
}

#[async_trait]
impl Geolocator for ConfiguredGeolocator {
    fn is_supported(&self) -> bool {
        self.enabled
    }

    async fn permission(&self) -> anyhow::Result<Option<PermissionState>> {
        Ok(self.permission)
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        if self.permission == Some(PermissionState::Denied) {
            return Err(PositionError::PermissionDenied);
        }
        self.position.ok_or(PositionError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_request_fresh_precise_fix() {
        let opts = PositionOptions::default();
        assert!(opts.enable_high_accuracy);
        assert_eq!(opts.timeout, Duration::from_secs(20));
        assert_eq!(opts.maximum_age, Duration::ZERO);
    }

    #[tokio::test]
    async fn configured_geolocator_reports_fixed_position() {
        let cfg = GeolocationConfig {
            latitude: Some(52.52),
            longitude: Some(13.41),
            ..GeolocationConfig::default()
        };
        let geo = ConfiguredGeolocator::new(&cfg);

        assert!(geo.is_supported());
        let pos = geo.current_position(&PositionOptions::default()).await.unwrap();
        assert_eq!(pos, Coordinates { latitude: 52.52, longitude: 13.41 });
    }

    #[tokio::test]
    async fn configured_geolocator_without_position_is_unavailable() {
        let geo = ConfiguredGeolocator::new(&GeolocationConfig::default());
        let err = geo.current_position(&PositionOptions::default()).await.unwrap_err();
        assert_eq!(err, PositionError::Unavailable);
        assert_eq!(geo.permission().await.unwrap(), None);
    }

    #[test]
    fn permission_state_parses_lowercase() {
        let state: PermissionState = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(state, PermissionState::Denied);
    }
}
