//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - OpenWeather geocoding and current-weather clients
//! - The lookup service and its observable state
//! - Persistence of the last searched city
//!
//! It is used by `weather-cli`, but can also be driven by any other front end
//! that renders [`LookupState`].

pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::LookupError;
pub use model::{Condition, Coordinates, GeocodeResult, WeatherReading};
pub use provider::{GeocodeProvider, WeatherProvider};
pub use service::WeatherLookupService;
pub use state::{LookupState, StateCell};
pub use store::LastQueryStore;
