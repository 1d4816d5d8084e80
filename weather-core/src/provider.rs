use crate::{
    Config,
    model::{Coordinates, GeocodeResult, WeatherReading},
    provider::openweather::{OpenWeatherClient, OpenWeatherGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Number of geocode matches requested by a city lookup.
pub const DEFAULT_GEOCODE_LIMIT: u32 = 1;

/// Resolves a free-text place name to coordinates.
///
/// Implementations return matches in provider relevance order and do not
/// validate the name.
#[async_trait]
pub trait GeocodeProvider: Send + Sync + Debug {
    async fn lookup(
        &self,
        city_name: &str,
        api_key: &str,
        limit: u32,
    ) -> anyhow::Result<Vec<GeocodeResult>>;
}

/// Fetches current conditions for a coordinate pair.
///
/// `Ok(None)` means the provider answered with no data.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_current(
        &self,
        coordinates: Coordinates,
        api_key: &str,
    ) -> anyhow::Result<Option<WeatherReading>>;
}

/// Construct both OpenWeather clients from the configured endpoints.
pub fn providers_from_config(
    config: &Config,
) -> anyhow::Result<(Arc<dyn GeocodeProvider>, Arc<dyn WeatherProvider>)> {
    let http = openweather::http_client()?;

    let geocoder: Arc<dyn GeocodeProvider> = Arc::new(OpenWeatherGeocoder::with_client(
        http.clone(),
        config.endpoints.geo_base_url.clone(),
    ));
    let weather: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherClient::with_client(
        http,
        config.endpoints.weather_base_url.clone(),
    ));

    Ok((geocoder, weather))
}
