use thiserror::Error;

/// Message shown whenever the approximate-location fallback fails, whatever the cause.
pub const LOCATION_UNAVAILABLE: &str =
    "Unable to retrieve your location. Please allow location access in the browser or try again.";

/// Network stage that produced a failure. Its display is the prefix of the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocoding,
    Forecast,
    IpLookup,
}

impl Stage {
    pub fn prefix(&self) -> &'static str {
        match self {
            Stage::Geocoding => "Error fetching city coordinates",
            Stage::Forecast => "Error fetching weather data",
            Stage::IpLookup => "Error looking up approximate location",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Why device geolocation could not be used at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermissionIssue {
    #[error("Geolocation is not supported by this browser.")]
    Unsupported,

    #[error(
        "Location permission is blocked in the browser. Please enable it for this site and try again."
    )]
    Blocked,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// The lookup succeeded but produced nothing usable.
    #[error("{stage}: {reason}")]
    NotFound { stage: Stage, reason: String },

    /// Transport failure, non-success status or an undecodable body.
    #[error("{stage}: {reason}")]
    Retrieval { stage: Stage, reason: String },

    #[error(transparent)]
    Permission(#[from] PermissionIssue),

    #[error(
        "Location was not granted. Please enable location access in your browser settings and try again."
    )]
    ConsentDeclined,

    /// Any failure inside the approximate-location fallback. The cause is kept for logs only.
    #[error("{}", LOCATION_UNAVAILABLE)]
    LocationUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WeatherError {
    pub fn not_found(stage: Stage, reason: impl Into<String>) -> Self {
        Self::NotFound { stage, reason: reason.into() }
    }

    pub fn retrieval(stage: Stage, reason: impl Into<String>) -> Self {
        Self::Retrieval { stage, reason: reason.into() }
    }

    /// Stage that failed, for network errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::NotFound { stage, .. } | Self::Retrieval { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Generic fallback failure caused by `cause`.
    pub fn unavailable(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::LocationUnavailable(cause.into())
    }

    /// Collapse into the generic fallback failure, keeping `self` as the source.
    pub fn into_unavailable(self) -> Self {
        match self {
            Self::LocationUnavailable(_) => self,
            other => Self::unavailable(other),
        }
    }
}
