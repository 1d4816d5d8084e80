use std::future::Future;

use tokio::sync::watch;
use weather_core::{
    GeocodeResult, LookupError, LookupState, WeatherLookupService, WeatherReading,
    display::{icon_url, summary_line},
};

/// Drive `lookup` to completion, printing a notice to stderr each time the
/// service enters Loading.
pub async fn with_loading_notice<T>(
    service: &WeatherLookupService,
    lookup: impl Future<Output = T>,
) -> T {
    drive_with_notice(service.subscribe(), lookup, || eprintln!("Fetching weather...")).await
}

/// State changes are checked before each poll of `lookup`, on the same task,
/// so a Loading published before a suspension is always observed.
async fn drive_with_notice<T>(
    mut rx: watch::Receiver<LookupState>,
    lookup: impl Future<Output = T>,
    mut on_loading: impl FnMut(),
) -> T {
    tokio::pin!(lookup);
    let mut watching = true;

    loop {
        tokio::select! {
            biased;

            changed = rx.changed(), if watching => match changed {
                Ok(()) => {
                    if rx.borrow_and_update().is_loading() {
                        on_loading();
                    }
                }
                Err(_) => watching = false,
            },
            out = &mut lookup => return out,
        }
    }
}

pub fn outcome(result: Result<WeatherReading, LookupError>, json: bool) -> anyhow::Result<()> {
    let reading = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else {
        println!("{}", reading_text(&reading));
    }
    Ok(())
}

pub fn reading_text(reading: &WeatherReading) -> String {
    let mut lines = vec![summary_line(reading)];

    if let Some(condition) = reading.primary_condition() {
        lines.push(format!("Conditions: {}", condition.description));
        lines.push(format!("Icon: {}", icon_url(&condition.icon_id)));
    }
    lines.push(format!("Humidity: {}%", reading.humidity_percent));
    lines.push(format!("Wind: {:.1} m/s", reading.wind_speed));

    lines.join("\n")
}

pub fn place_line(place: &GeocodeResult) -> String {
    let mut name = place.display_name.clone();
    if let Some(region) = &place.region {
        name.push_str(", ");
        name.push_str(region);
    }
    format!("{name}, {} ({})", place.country, place.coordinates)
}
