//! Values derived from a [`WeatherReading`] for presentation.
//!
//! Nothing here is part of the wire format.

use crate::model::WeatherReading;

const KELVIN_OFFSET: f64 = 273.15;
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Whole degrees as shown on screen: the fraction is dropped, not rounded.
pub fn display_degrees(value: f64) -> i64 {
    value.trunc() as i64
}

/// URL of the 2x icon image for an OpenWeather icon id such as `01d`.
pub fn icon_url(icon_id: &str) -> String {
    format!("{ICON_BASE_URL}/{icon_id}@2x.png")
}

/// "Weather in Paris: 16°C / 62°F"
pub fn summary_line(reading: &WeatherReading) -> String {
    let celsius = kelvin_to_celsius(f64::from(reading.temperature_kelvin));
    let fahrenheit = celsius_to_fahrenheit(celsius);

    format!(
        "Weather in {}: {}°C / {}°F",
        reading.location_name,
        display_degrees(celsius),
        display_degrees(fahrenheit)
    )
}
