use serde::{Deserialize, Serialize};

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One match returned by the geocoder, in provider relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinates: Coordinates,
    pub display_name: String,
    pub country: String,
    /// State or province, when the provider knows it.
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon_id: String,
}

/// Current conditions at a single coordinate pair.
///
/// `conditions` is never empty; the first entry is the one shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location_name: String,
    pub temperature_kelvin: f32,
    pub humidity_percent: u8,
    pub conditions: Vec<Condition>,
    pub wind_speed: f32,
}

impl WeatherReading {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}
