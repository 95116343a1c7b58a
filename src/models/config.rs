use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration embedded in every persisted [`AppState`](crate::models::AppState).
///
/// The three integration sections are independently optional. `None` means the
/// integration is unset; it is written as `null` and both `null` and a missing
/// key load back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,

    /// Memory ceiling for the supervised process
    pub max_ram_usage: u64,

    /// CPU time ceiling for the supervised process
    pub max_cpu_usage: u64,

    /// Deployment label, e.g. "development" or "production"
    pub environment: String,

    pub debug_mode: bool,

    /// Log verbosity label ("Error", "Warn", "Info", "Debug", "Trace").
    /// Kept as free text so hand-written files with other spellings still load.
    pub log_level: String,

    pub git: Option<GitConfig>,
    pub database: Option<DatabaseConfig>,
    pub aggregator: Option<AggregatorConfig>,
}

/// Source-control integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// "GitHub", "GitLab", or a custom server URL
    pub default_server: String,
    pub credentials_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

/// Local aggregator socket settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub socket_path: String,

    /// Unix mode bits applied to the socket, e.g. `0o660`
    #[serde(default)]
    pub socket_permission: Option<u32>,
}

/// Reasons an [`AppConfig`] is rejected by [`AppConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("app_name must be provided")]
    MissingAppName,

    #[error("git.credentials_file must be provided when git is configured")]
    MissingGitCredentials,

    #[error("database.pool_size must be greater than 0")]
    EmptyDatabasePool,

    #[error("aggregator.socket_path must be provided when the aggregator is configured")]
    MissingAggregatorSocket,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "MyApp".to_string(),
            max_ram_usage: 0,
            max_cpu_usage: 0,
            environment: "development".to_string(),
            debug_mode: false,
            log_level: "Info".to_string(),
            git: None,
            database: None,
            aggregator: None,
        }
    }
}

impl AppConfig {
    /// Check the configuration for values a supervisor cannot work with.
    ///
    /// Loading a state file never calls this; it is up to the owner of the
    /// config to decide when validation applies.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.app_name.trim().is_empty() {
            return Err(ValidationError::MissingAppName);
        }

        if let Some(git) = &self.git {
            if git.credentials_file.trim().is_empty() {
                return Err(ValidationError::MissingGitCredentials);
            }
        }

        if let Some(database) = &self.database {
            if database.pool_size == 0 {
                return Err(ValidationError::EmptyDatabasePool);
            }
        }

        if let Some(aggregator) = &self.aggregator {
            if aggregator.socket_path.trim().is_empty() {
                return Err(ValidationError::MissingAggregatorSocket);
            }
        }

        Ok(())
    }

    /// The `log_level` label as a tracing level, if it names one.
    pub fn tracing_level(&self) -> Option<tracing::Level> {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "error" => Some(tracing::Level::ERROR),
            "warn" | "warning" => Some(tracing::Level::WARN),
            "info" => Some(tracing::Level::INFO),
            "debug" => Some(tracing::Level::DEBUG),
            "trace" => Some(tracing::Level::TRACE),
            _ => None,
        }
    }
}
