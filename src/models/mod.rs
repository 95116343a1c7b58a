//! Data models for persisted application state.
//!
//! - [`AppState`]: the root record written to and read from a state file
//! - [`AppConfig`]: configuration embedded in every state, with optional
//!   [`GitConfig`], [`DatabaseConfig`] and [`AggregatorConfig`] sections
//! - [`ErrorItem`]: one entry in the state's error log
//! - [`Status`]: lifecycle labels written into [`AppState::status`]
//!
//! Field names on these types are the on-disk JSON keys. Renaming a field
//! breaks every state file already written.

pub mod app_state;
pub mod config;

pub use app_state::{AppState, ErrorItem, OutputLine, Status, UnknownStatus};
pub use config::{AggregatorConfig, AppConfig, DatabaseConfig, GitConfig, ValidationError};
