use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{error::LookupError, model::WeatherReading};

/// What the presentation layer should currently show.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Success(WeatherReading),
    #[serde(serialize_with = "serialize_error")]
    Error(LookupError),
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading)
    }

    pub fn reading(&self) -> Option<&WeatherReading> {
        match self {
            LookupState::Success(reading) => Some(reading),
            _ => None,
        }
    }

    /// User-visible error text, if the last lookup failed.
    pub fn error_message(&self) -> Option<String> {
        match self {
            LookupState::Error(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

fn serialize_error<S: serde::Serializer>(err: &LookupError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&err.to_string())
}

/// Identifies one lookup. Ids increase monotonically per [`StateCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable lookup state shared between the service and its observers.
///
/// Only the most recently started lookup may publish a terminal state;
/// completions of superseded lookups are dropped.
#[derive(Debug)]
pub struct StateCell {
    latest: AtomicU64,
    tx: watch::Sender<LookupState>,
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LookupState::Idle);
        Self { latest: AtomicU64::new(0), tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> LookupState {
        self.tx.borrow().clone()
    }

    /// Start a lookup: issue a fresh id and enter Loading.
    ///
    /// The id is issued under the same write lock that publishes Loading, so
    /// a newer lookup's terminal state can never be overwritten by an older
    /// lookup's Loading.
    pub fn begin(&self) -> RequestId {
        let mut id = RequestId(0);
        self.tx.send_modify(|state| {
            id = RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
            *state = LookupState::Loading;
        });
        debug!(request = %id, "Lookup started");
        id
    }

    /// Publish the outcome of lookup `id`. Returns false if a newer lookup
    /// has started since, in which case the state is left untouched.
    pub fn finish(&self, id: RequestId, outcome: Result<WeatherReading, LookupError>) -> bool {
        let mut outcome = Some(outcome);

        let published = self.tx.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != id.0 {
                return false;
            }
            *state = match outcome.take() {
                Some(Ok(reading)) => LookupState::Success(reading),
                Some(Err(err)) => LookupState::Error(err),
                None => return false,
            };
            true
        });

        if !published {
            warn!(request = %id, "Dropping response of a superseded lookup");
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Condition;
    use pretty_assertions::assert_eq;

    fn reading(name: &str) -> WeatherReading {
        WeatherReading {
            location_name: name.into(),
            temperature_kelvin: 290.0,
            humidity_percent: 60,
            conditions: vec![Condition { description: "clear sky".into(), icon_id: "01d".into() }],
            wind_speed: 3.0,
        }
    }

    #[test]
    fn starts_idle() {
        let cell = StateCell::new();
        assert_eq!(cell.current(), LookupState::Idle);
        assert!(!cell.current().is_loading());
    }

    #[test]
    fn begin_then_finish_publishes_outcome() {
        let cell = StateCell::new();

        let id = cell.begin();
        assert!(cell.current().is_loading());

        assert!(cell.finish(id, Ok(reading("Paris"))));
        assert_eq!(cell.current(), LookupState::Success(reading("Paris")));
    }

    #[test]
    fn request_ids_increase() {
        let cell = StateCell::new();
        let first = cell.begin();
        let second = cell.begin();
        assert!(second > first);
    }

    #[test]
    fn stale_completion_is_dropped() {
        let cell = StateCell::new();
        let first = cell.begin();
        let second = cell.begin();

        assert!(!cell.finish(first, Ok(reading("Stale"))));
        assert!(cell.current().is_loading());

        assert!(cell.finish(second, Err(LookupError::NotFound)));
        assert_eq!(
            cell.current().error_message().as_deref(),
            Some("Could not find coordinates for the city.")
        );

        assert!(!cell.finish(first, Ok(reading("Stale"))));
        assert_eq!(cell.current(), LookupState::Error(LookupError::NotFound));
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let cell = StateCell::new();
        let mut rx = cell.subscribe();

        let id = cell.begin();
        rx.changed().await.expect("sender alive");
        assert!(rx.borrow_and_update().is_loading());

        cell.finish(id, Ok(reading("Paris")));
        rx.changed().await.expect("sender alive");
        assert_eq!(
            rx.borrow_and_update().reading().map(|r| r.location_name.as_str()),
            Some("Paris")
        );
    }

    #[test]
    fn concurrent_lookups_always_leave_a_terminal_state() {
        use std::sync::{Arc, Barrier};

        const THREADS: usize = 8;

        for round in 0..500 {
            let cell = Arc::new(StateCell::new());
            let barrier = Arc::new(Barrier::new(THREADS));

            let handles: Vec<_> = (0..THREADS)
                .map(|n| {
                    let cell = Arc::clone(&cell);
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        let id = cell.begin();
                        cell.finish(id, Ok(reading(&format!("City {n}"))));
                    })
                })
                .collect();

            for handle in handles {
                handle.join().expect("worker thread");
            }

            assert!(!cell.current().is_loading(), "left in Loading on round {round}");
        }
    }

    #[test]
    fn serializes_error_as_message() {
        let json = serde_json::to_value(LookupState::Error(LookupError::NotFound)).expect("json");
        assert_eq!(
            json,
            serde_json::json!({"state": "error", "value": "Could not find coordinates for the city."})
        );
    }
}
