//! Core library for the `weather-now` CLI.
//!
//! This crate defines:
//! - Weather code classification (descriptions and icons)
//! - Clients for geocoding, forecasts and IP-based location
//! - Device geolocation and consent abstractions
//! - The orchestrator that turns a query into a single `AppResult`
//! - Configuration handling
//!
//! It is used by `weather-now`, but the orchestrator works with any front end
//! that can implement [`Geolocator`] and [`ConsentPrompt`].

pub mod condition;
pub mod config;
pub mod error;
pub mod locate;
pub mod model;
pub mod orchestrator;
pub mod provider;

pub use condition::{Icon, describe, icon_for};
pub use config::{Config, Endpoints, GeolocationConfig};
pub use error::{PermissionIssue, Stage, WeatherError};
pub use locate::{
    ConfiguredGeolocator, ConsentPrompt, Coordinates, Geolocator, PermissionState, PositionError,
    PositionOptions,
};
pub use model::{AppResult, ApproximateLocation, LocationQuery, ResolvedCity, WeatherSnapshot};
pub use orchestrator::WeatherApp;
pub use provider::{ForecastSource, Geocoder, IpLocator, Providers};
