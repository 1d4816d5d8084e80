use std::{fmt, sync::Arc};

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::{
    Config,
    error::LookupError,
    model::{Coordinates, GeocodeResult, WeatherReading},
    provider::{DEFAULT_GEOCODE_LIMIT, GeocodeProvider, WeatherProvider, providers_from_config},
    state::{LookupState, StateCell},
};

/// Runs lookups (optionally geocoding first) and publishes their progress
/// on a shared [`StateCell`].
///
/// Cloning is cheap; clones share providers and state.
#[derive(Clone)]
pub struct WeatherLookupService {
    geocoder: Arc<dyn GeocodeProvider>,
    weather: Arc<dyn WeatherProvider>,
    api_key: String,
    state: Arc<StateCell>,
}

impl fmt::Debug for WeatherLookupService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherLookupService")
            .field("geocoder", &self.geocoder)
            .field("weather", &self.weather)
            .field("api_key", &"<redacted>")
            .field("state", &self.state)
            .finish()
    }
}

impl WeatherLookupService {
    pub fn new(
        geocoder: Arc<dyn GeocodeProvider>,
        weather: Arc<dyn WeatherProvider>,
        api_key: impl Into<String>,
    ) -> Self {
        Self { geocoder, weather, api_key: api_key.into(), state: Arc::new(StateCell::new()) }
    }

    /// Build a service bound to OpenWeather using the configured key and endpoints.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?;
        let (geocoder, weather) = providers_from_config(config)?;
        Ok(Self::new(geocoder, weather, api_key))
    }

    pub fn state(&self) -> LookupState {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.state.subscribe()
    }

    /// Geocode `name`, then fetch current weather at the first match.
    ///
    /// The caller is expected to reject empty names before calling.
    #[instrument(skip(self))]
    pub async fn fetch_by_city(&self, name: &str) -> Result<WeatherReading, LookupError> {
        let id = self.state.begin();
        let outcome = self.lookup_city(name).await;
        report(&outcome);
        self.state.finish(id, outcome.clone());
        outcome
    }

    /// Fetch current weather at `(lat, lon)` without geocoding.
    #[instrument(skip(self))]
    pub async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReading, LookupError> {
        let id = self.state.begin();
        let outcome = self.lookup_coordinates(Coordinates::new(lat, lon)).await;
        report(&outcome);
        self.state.finish(id, outcome.clone());
        outcome
    }

    /// Raw geocoder matches for `name`, in provider order. Does not touch the
    /// lookup state.
    pub async fn geocode(&self, name: &str, limit: u32) -> anyhow::Result<Vec<GeocodeResult>> {
        self.geocoder.lookup(name, &self.api_key, limit).await
    }

    async fn lookup_city(&self, name: &str) -> Result<WeatherReading, LookupError> {
        let matches = self
            .geocoder
            .lookup(name, &self.api_key, DEFAULT_GEOCODE_LIMIT)
            .await
            .map_err(|err| LookupError::network(&err))?;

        let first = matches.into_iter().next().ok_or(LookupError::NotFound)?;
        info!(
            city = name,
            resolved = %first.display_name,
            country = %first.country,
            coordinates = %first.coordinates,
            "Geocoded city"
        );

        self.lookup_coordinates(first.coordinates).await
    }

    async fn lookup_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherReading, LookupError> {
        self.weather
            .get_current(coordinates, &self.api_key)
            .await
            .map_err(|err| LookupError::network(&err))?
            .ok_or(LookupError::NoData)
    }
}

fn report(outcome: &Result<WeatherReading, LookupError>) {
    match outcome {
        Ok(reading) => info!(location = %reading.location_name, "Lookup succeeded"),
        Err(err) => warn!(error = %err, "Lookup failed"),
    }
}
