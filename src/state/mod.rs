// State persistence module
//
// StatePersistence moves an AppState to and from a JSON file. The lifecycle
// helpers build on it to stamp, count and save state as a process runs.

mod lifecycle;

pub use lifecycle::{current_timestamp, log_error, update_state, wind_down_state};

use crate::models::{AppConfig, AppState};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use thiserror::Error;

/// Errors from reading or writing a state file.
///
/// The underlying I/O or JSON error is kept unchanged as the `source`.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("State file I/O failed for {path}: {source}")]
    Io { path: Utf8PathBuf, source: io::Error },

    #[error("State file {path} is not a valid state document: {source}")]
    Format {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

impl PersistenceError {
    /// The file the failed operation was working on.
    pub fn path(&self) -> &Utf8Path {
        match self {
            PersistenceError::Io { path, .. } | PersistenceError::Format { path, .. } => path,
        }
    }

    /// True when the state file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Loads and saves [`AppState`] as pretty-printed JSON.
///
/// Writes are plain overwrites: there is no temp file and no lock, so a crash
/// mid-write can leave a truncated file and concurrent writers race with the
/// last one winning.
pub struct StatePersistence;

impl StatePersistence {
    /// Default state file for an application: `/tmp/.<app_name>.state`.
    pub fn state_path(config: &AppConfig) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("/tmp/.{}.state", config.app_name))
    }

    /// Serialize `state` and replace whatever is at `path` with it.
    ///
    /// # Errors
    /// - [`PersistenceError::Format`] if serialization fails
    /// - [`PersistenceError::Io`] if the file cannot be written
    pub fn save_state<P: AsRef<Utf8Path>>(state: &AppState, path: P) -> Result<(), PersistenceError> {
        let path = path.as_ref();

        let json = serde_json::to_string_pretty(state).map_err(|source| {
            PersistenceError::Format {
                path: path.to_path_buf(),
                source,
            }
        })?;

        fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Saved state for {} to {}", state.name, path);
        Ok(())
    }

    /// Read the state file at `path` and rebuild the [`AppState`] it holds.
    ///
    /// Nothing is defaulted beyond the optional sections and the list fields;
    /// a file missing `config`, `pid` or any other required key is rejected.
    ///
    /// # Errors
    /// - [`PersistenceError::Io`] if the file is missing or unreadable
    /// - [`PersistenceError::Format`] if it is not JSON or not shaped like a state
    pub fn load_state<P: AsRef<Utf8Path>>(path: P) -> Result<AppState, PersistenceError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let state: AppState =
            serde_json::from_str(&contents).map_err(|source| PersistenceError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Loaded state for {} from {}", state.name, path);
        Ok(state)
    }
}
