// statekeep - JSON state persistence for supervised applications
//
// This is the library crate containing the state and config records and the
// functions that persist them. The binary crate (main.rs) inspects a state file.

pub mod config;
pub mod logging;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use self::config::ConfigManager;
pub use models::{AppConfig, AppState, ErrorItem, Status};
pub use state::{PersistenceError, StatePersistence};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
