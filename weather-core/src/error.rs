use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "Could not find coordinates for the city.";
pub const NO_DATA_MESSAGE: &str = "No weather data available for this location.";
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a city name.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Failure of a single lookup, as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
    #[error("{}", NO_DATA_MESSAGE)]
    NoData,
    #[error("{0}")]
    Network(String),
    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,
}

impl LookupError {
    /// Wrap a transport or parse failure, keeping its full context chain.
    pub fn network(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        if message.trim().is_empty() {
            Self::Network(UNKNOWN_ERROR_MESSAGE.to_string())
        } else {
            Self::Network(message)
        }
    }
}
