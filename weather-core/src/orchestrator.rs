//! Turns a user's query into exactly one `AppResult`.
//!
//! Two entry points exist: [`WeatherApp::search`] for a typed place name and
//! [`WeatherApp::current_location`] for the device position, which falls back to an
//! IP-based approximation when the user agrees to it. Every query takes a fresh
//! generation number; a result whose generation is no longer current is dropped, so a
//! slow, superseded query can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{PermissionIssue, WeatherError},
    locate::{
        APPROXIMATE_PROMPT, ConsentPrompt, Coordinates, Geolocator, PermissionState,
        PositionError, PositionOptions,
    },
    model::{AppResult, LocationQuery, ResolvedCity, WeatherSnapshot},
    provider::Providers,
};

type Resolved = (ResolvedCity, WeatherSnapshot);

#[derive(Debug)]
pub struct WeatherApp {
    providers: Providers,
    geolocator: Box<dyn Geolocator>,
    consent: Box<dyn ConsentPrompt>,
    state: watch::Sender<AppResult>,
    generation: AtomicU64,
    position_options: PositionOptions,
}

impl WeatherApp {
    pub fn new(
        providers: Providers,
        geolocator: Box<dyn Geolocator>,
        consent: Box<dyn ConsentPrompt>,
    ) -> Self {
        let (state, _) = watch::channel(AppResult::Idle);
        Self {
            providers,
            geolocator,
            consent,
            state,
            generation: AtomicU64::new(0),
            position_options: PositionOptions::default(),
        }
    }

    /// Override the options used for device position requests.
    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    /// Snapshot of the current status.
    pub fn state(&self) -> AppResult {
        self.state.borrow().clone()
    }

    /// Receiver notified on every status transition.
    pub fn subscribe(&self) -> watch::Receiver<AppResult> {
        self.state.subscribe()
    }

    /// Run whichever flow `query` asks for.
    pub async fn run(&self, query: LocationQuery) -> AppResult {
        match query {
            LocationQuery::Search(text) => self.search(&text).await,
            LocationQuery::CurrentLocation => self.current_location().await,
        }
    }

    /// The "try again" / "search again" action: `Success` or `Error` back to `Idle`.
    ///
    /// Returns false, leaving the state untouched, from `Idle` or `Loading`.
    pub fn reset(&self) -> bool {
        self.state.send_if_modified(|state| {
            if !matches!(state, AppResult::Success { .. } | AppResult::Error { .. }) {
                return false;
            }
            *state = AppResult::Idle;
            true
        })
    }

    /// Search flow: geocode `text`, then fetch weather for the match.
    ///
    /// Whitespace-only input is ignored: no request is made and the state is unchanged.
    pub async fn search(&self, text: &str) -> AppResult {
        let name = text.trim();
        if name.is_empty() {
            debug!("ignoring empty search");
            return self.state();
        }

        let generation = self.begin();
        info!(generation, query = name, "search started");

        let outcome = self.search_inner(name).await;
        self.finish(generation, outcome)
    }

    async fn search_inner(&self, name: &str) -> Result<Resolved, WeatherError> {
        let city = self.providers.geocoder.resolve_city(name).await?;
        let weather = self.providers.forecast.fetch_weather(city.latitude, city.longitude).await?;
        Ok((city, weather))
    }

    /// "Use my location" flow with the permission probe and the approximate fallback.
    pub async fn current_location(&self) -> AppResult {
        let generation = self.begin_quietly();

        if !self.geolocator.is_supported() {
            return self.finish(generation, Err(PermissionIssue::Unsupported.into()));
        }

        self.enter_loading(generation);
        info!(generation, "current location lookup started");

        let outcome = self.current_location_inner().await;
        self.finish(generation, outcome)
    }

    async fn current_location_inner(&self) -> Result<Resolved, WeatherError> {
        // Advisory only: an unsupported or failing probe must not block the lookup.
        match self.geolocator.permission().await {
            Ok(Some(PermissionState::Denied)) => return Err(PermissionIssue::Blocked.into()),
            Ok(state) => debug!(?state, "geolocation permission probed"),
            Err(e) => debug!(error = %e, "permission probe failed; continuing"),
        }

        match self.device_position().await {
            Ok(coords) => {
                let city = ResolvedCity::current_location(coords);
                let weather =
                    self.providers.forecast.fetch_weather(city.latitude, city.longitude).await?;
                Ok((city, weather))
            }
            Err(e) => {
                warn!(error = %e, "device position unavailable; offering approximate location");
                self.approximate_fallback().await
            }
        }
    }

    async fn device_position(&self) -> Result<Coordinates, PositionError> {
        let options = self.position_options;
        tokio::time::timeout(options.timeout, self.geolocator.current_position(&options))
            .await
            .unwrap_or(Err(PositionError::Timeout))
    }

    async fn approximate_fallback(&self) -> Result<Resolved, WeatherError> {
        let allowed = self
            .consent
            .allow_approximate(APPROXIMATE_PROMPT)
            .await
            .map_err(WeatherError::unavailable)?;

        if !allowed {
            info!("approximate location declined");
            return Err(WeatherError::ConsentDeclined);
        }

        let lookup = async {
            let city = ResolvedCity::from(self.providers.ip_locator.locate().await?);
            let weather =
                self.providers.forecast.fetch_weather(city.latitude, city.longitude).await?;
            Ok::<_, WeatherError>((city, weather))
        };

        lookup.await.map_err(WeatherError::into_unavailable)
    }

    /// Start a query: bump the generation and enter `Loading`.
    fn begin(&self) -> u64 {
        let generation = self.begin_quietly();
        self.enter_loading(generation);
        generation
    }

    fn begin_quietly(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn enter_loading(&self, generation: u64) {
        self.apply(generation, AppResult::Loading);
    }

    /// Settle the query, leaving `Loading` on every path. Returns the resulting state.
    fn finish(&self, generation: u64, outcome: Result<Resolved, WeatherError>) -> AppResult {
        let next = match outcome {
            Ok((city, weather)) => {
                info!(generation, city = %city.name, "weather ready");
                AppResult::Success { city, weather }
            }
            Err(e) => {
                match std::error::Error::source(&e) {
                    Some(cause) => warn!(generation, error = %e, %cause, "query failed"),
                    None => warn!(generation, error = %e, "query failed"),
                }
                AppResult::Error { message: e.to_string() }
            }
        };

        if !self.apply(generation, next) {
            debug!(generation, "discarding superseded result");
        }
        self.state()
    }

    /// Write `next` if `generation` is still the latest query.
    fn apply(&self, generation: u64, next: AppResult) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        })
    }
}
