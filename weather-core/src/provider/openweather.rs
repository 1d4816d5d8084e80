use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::model::{Condition, Coordinates, GeocodeResult, WeatherReading};

use super::{GeocodeProvider, WeatherProvider};

/// Shared HTTP client. No explicit timeout: the transport default applies.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("weather-lookup/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Client for the OpenWeather direct geocoding endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    http: Client,
    base_url: String,
}

impl OpenWeatherGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(http_client()?, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }
}

/// Client for the OpenWeather current-conditions endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(http_client()?, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    lat: f64,
    lon: f64,
    name: String,
    country: String,
    state: Option<String>,
}

impl From<OwGeoEntry> for GeocodeResult {
    fn from(entry: OwGeoEntry) -> Self {
        Self {
            coordinates: Coordinates::new(entry.lat, entry.lon),
            display_name: entry.name,
            country: entry.country,
            region: entry.state,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f32,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl TryFrom<OwCurrentResponse> for WeatherReading {
    type Error = anyhow::Error;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self> {
        if parsed.weather.is_empty() {
            return Err(anyhow!("OpenWeather current response contained no conditions"));
        }

        Ok(Self {
            location_name: parsed.name,
            temperature_kelvin: parsed.main.temp,
            humidity_percent: parsed.main.humidity,
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| Condition { description: w.description, icon_id: w.icon })
                .collect(),
            wind_speed: parsed.wind.speed,
        })
    }
}

#[async_trait]
impl GeocodeProvider for OpenWeatherGeocoder {
    async fn lookup(&self, city_name: &str, api_key: &str, limit: u32) -> Result<Vec<GeocodeResult>> {
        let url = endpoint(&self.base_url, "direct");
        let limit = limit.to_string();
        debug!(city = city_name, limit = %limit, "Requesting OpenWeather geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city_name), ("appid", api_key), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to OpenWeather (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read OpenWeather geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: Vec<OwGeoEntry> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        debug!(city = city_name, matches = parsed.len(), "OpenWeather geocoding answered");
        Ok(parsed.into_iter().map(GeocodeResult::from).collect())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn get_current(
        &self,
        coordinates: Coordinates,
        api_key: &str,
    ) -> Result<Option<WeatherReading>> {
        let url = endpoint(&self.base_url, "weather");
        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();
        debug!(
            lat = coordinates.latitude,
            lon = coordinates.longitude,
            "Requesting OpenWeather current weather"
        );

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            debug!("OpenWeather current weather returned an empty body");
            return Ok(None);
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(trimmed).context("Failed to parse OpenWeather current JSON")?;

        WeatherReading::try_from(parsed).map(Some)
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
