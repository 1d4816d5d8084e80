use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tracing::{debug, warn};
use weather_core::{Config, LastQueryStore, LookupError, WeatherLookupService};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather by city or coordinates")]
pub struct Cli {
    /// Log lookups and HTTP requests to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure {
        /// Key to store; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show weather for a city. Defaults to the last searched city.
    Show {
        city: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show weather for coordinates, e.g. the device's current location.
    Here {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List geocoding matches for a city, best first.
    Geocode {
        city: String,

        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print the reading as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => configure(api_key),
            Command::Show { city, output } => show(city, output).await,
            Command::Here { lat, lon, output } => here(lat, lon, output).await,
            Command::Geocode { city, limit } => geocode(&city, limit).await,
        }
    }
}

fn configure(api_key: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    config.set_api_key(api_key.to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: Option<String>, output: OutputArgs) -> anyhow::Result<()> {
    let store = LastQueryStore::open_default()?;

    let submitted = city.is_some();
    let city = match city {
        Some(city) => city,
        None => last_city(&store),
    };

    let city = city.trim();
    if city.is_empty() {
        return Err(LookupError::EmptyInput.into());
    }

    if submitted {
        if let Err(err) = store.save(city) {
            warn!(error = %format!("{err:#}"), "Could not remember the searched city");
        }
    } else {
        debug!(city, "Using last searched city");
    }

    let service = WeatherLookupService::from_config(&Config::load()?)?;
    let result = render::with_loading_notice(&service, service.fetch_by_city(city)).await;

    render::outcome(result, output.json)
}

fn last_city(store: &LastQueryStore) -> String {
    match store.get_last() {
        Ok(city) => city.unwrap_or_default(),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "Ignoring unreadable preferences");
            String::new()
        }
    }
}

async fn here(lat: f64, lon: f64, output: OutputArgs) -> anyhow::Result<()> {
    let service = WeatherLookupService::from_config(&Config::load()?)?;
    let result =
        render::with_loading_notice(&service, service.fetch_by_coordinates(lat, lon)).await;

    render::outcome(result, output.json)
}

async fn geocode(city: &str, limit: u32) -> anyhow::Result<()> {
    let city = city.trim();
    if city.is_empty() {
        return Err(LookupError::EmptyInput.into());
    }

    let service = WeatherLookupService::from_config(&Config::load()?)?;
    let matches = service.geocode(city, limit).await?;

    if matches.is_empty() {
        return Err(LookupError::NotFound.into());
    }

    for (idx, place) in matches.iter().enumerate() {
        println!("{}. {}", idx + 1, render::place_line(place));
    }
    Ok(())
}
