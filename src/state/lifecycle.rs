use super::StatePersistence;
use crate::models::{AppState, ErrorItem, Status};
use camino::Utf8Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Error type recorded when the state itself could not be saved.
const GENERAL_ERROR: &str = "GeneralError";

/// Seconds since the Unix epoch, or 0 if the clock is before it.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Stamp `state` with the current time, bump its event counter and save it.
///
/// A failed save does not propagate. It is logged and appended to
/// `state.error_log` so the next successful save carries it.
pub fn update_state<P: AsRef<Utf8Path>>(state: &mut AppState, path: P) {
    state.last_updated = current_timestamp();
    state.event_counter = state.event_counter.saturating_add(1);

    if let Err(err) = StatePersistence::save_state(state, path) {
        tracing::error!("Failed to save state: {}", err);
        state
            .error_log
            .push(ErrorItem::new(GENERAL_ERROR, err.to_string()));
    }

    tracing::debug!(
        "State updated: {} event_counter={}",
        state.name,
        state.event_counter
    );
}

/// Final update before shutdown: marks the state terminated and stopping, then saves.
pub fn wind_down_state<P: AsRef<Utf8Path>>(state: &mut AppState, path: P) {
    state.data = String::from("Terminated");
    state.set_status(Status::Stopping);
    state.error_log.push(ErrorItem::new(
        GENERAL_ERROR,
        "Wind down requested - check logs",
    ));
    update_state(state, path);
}

/// Record `error` in the state, flag the state as `Warning` and save.
pub fn log_error<P: AsRef<Utf8Path>>(state: &mut AppState, error: ErrorItem, path: P) {
    tracing::error!("{}", error);
    state.error_log.push(error);
    state.set_status(Status::Warning);
    update_state(state, path);
}
