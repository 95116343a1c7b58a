use crate::models::AppConfig;
use crate::state::current_timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A captured line of process output, paired with the Unix timestamp it was read at.
///
/// Serialized as a two-element JSON array: `[1700000000, "line"]`.
pub type OutputLine = (u64, String);

/// A single entry in [`AppState::error_log`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    pub err_type: String,
    pub err_mesg: String,
}

impl ErrorItem {
    pub fn new(err_type: impl Into<String>, err_mesg: impl Into<String>) -> Self {
        Self {
            err_type: err_type.into(),
            err_mesg: err_mesg.into(),
        }
    }
}

impl fmt::Display for ErrorItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.err_type, self.err_mesg)
    }
}

/// Lifecycle labels a supervised application moves through.
///
/// The persisted [`AppState::status`] field is free text; these are the labels
/// this crate writes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Starting,
    Running,
    Idle,
    Stopping,
    Stopped,
    Unknown,
    Warning,
    Building,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Starting => "Starting",
            Status::Running => "Running",
            Status::Idle => "Idle",
            Status::Stopping => "Stopping",
            Status::Stopped => "Stopped",
            Status::Unknown => "Unknown",
            Status::Warning => "Warning",
            Status::Building => "Building",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status label that names none of the [`Status`] variants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown status label: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starting" => Ok(Status::Starting),
            "running" => Ok(Status::Running),
            "idle" => Ok(Status::Idle),
            "stopping" => Ok(Status::Stopping),
            "stopped" => Ok(Status::Stopped),
            "unknown" => Ok(Status::Unknown),
            "warning" => Ok(Status::Warning),
            "building" => Ok(Status::Building),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Persisted runtime state of one supervised application.
///
/// This is the root record written by
/// [`StatePersistence::save_state`](crate::state::StatePersistence::save_state).
/// Field names are the wire format, including `stared_at`, which existing
/// state files already use for the launch timestamp.
///
/// `error_log`, `stdout`, `stderr` and `system_application` may be left out of
/// a hand-written file and load as empty / `false`. Every other field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub name: String,
    pub version: String,

    /// Small free-form payload owned by the application
    pub data: String,

    /// Lifecycle label, normally one of the [`Status`] names
    pub status: String,

    pub pid: u32,

    /// Unix timestamp of the last [`update_state`](crate::state::update_state)
    pub last_updated: u64,

    /// Unix timestamp of the launch
    pub stared_at: u64,

    /// Bumped once per state update, so an observer can tell the process is alive
    pub event_counter: u32,

    #[serde(default)]
    pub error_log: Vec<ErrorItem>,

    pub config: AppConfig,

    /// `true` for core system processes, `false` for user applications
    #[serde(default)]
    pub system_application: bool,

    #[serde(default)]
    pub stdout: Vec<OutputLine>,

    #[serde(default)]
    pub stderr: Vec<OutputLine>,
}

impl AppState {
    /// Fresh state for the current process, stamped with the current time.
    pub fn new(name: impl Into<String>, version: impl Into<String>, config: AppConfig) -> Self {
        let now = current_timestamp();
        Self {
            name: name.into(),
            version: version.into(),
            data: String::new(),
            status: Status::Starting.to_string(),
            pid: std::process::id(),
            last_updated: now,
            stared_at: now,
            event_counter: 0,
            error_log: Vec::new(),
            config,
            system_application: false,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    /// The stored status label parsed as a [`Status`], or `None` for labels this crate doesn't know.
    pub fn status(&self) -> Option<Status> {
        self.status.parse().ok()
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status.to_string();
    }

    /// Append a captured stdout line stamped with the current time.
    pub fn record_stdout(&mut self, line: impl Into<String>) {
        self.stdout.push((current_timestamp(), line.into()));
    }

    /// Append a captured stderr line stamped with the current time.
    pub fn record_stderr(&mut self, line: impl Into<String>) {
        self.stderr.push((current_timestamp(), line.into()));
    }
}

fn or_none<T, F>(f: &mut fmt::Formatter<'_>, label: &str, value: &Option<T>, body: F) -> fmt::Result
where
    F: FnOnce(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
{
    match value {
        Some(inner) => {
            writeln!(f, "    {}:", label)?;
            body(f, inner)
        }
        None => writeln!(f, "    {}: None", label),
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AppState: {} v{} (pid {})", self.name, self.version, self.pid)?;
        writeln!(f, "  Data: {}", self.data)?;
        writeln!(f, "  Started At: {}", self.stared_at)?;
        writeln!(f, "  Last Updated: {}", self.last_updated)?;
        writeln!(f, "  Event Counter: {}", self.event_counter)?;

        writeln!(f, "  Error Log:")?;
        if self.error_log.is_empty() {
            writeln!(f, "    No errors")?;
        } else {
            for (i, error) in self.error_log.iter().enumerate() {
                writeln!(f, "    Error {}: {}", i + 1, error)?;
            }
        }

        let config = &self.config;
        writeln!(f, "  Config:")?;
        writeln!(f, "    App Name: {}", config.app_name)?;
        writeln!(f, "    Ram Limit: {}", config.max_ram_usage)?;
        writeln!(f, "    Cpu Time Limit: {}", config.max_cpu_usage)?;
        writeln!(f, "    Environment: {}", config.environment)?;
        writeln!(
            f,
            "    Debug Mode: {}",
            if config.debug_mode { "Enabled" } else { "Disabled" }
        )?;
        writeln!(f, "    Log Level: {}", config.log_level)?;

        or_none(f, "Git Configuration", &config.git, |f, git| {
            writeln!(f, "      Default Server: {}", git.default_server)?;
            writeln!(f, "      Credentials File: {}", git.credentials_file)
        })?;
        or_none(f, "Database Configuration", &config.database, |f, db| {
            writeln!(f, "      URL: {}", db.url)?;
            writeln!(f, "      Connection Pool Size: {}", db.pool_size)
        })?;
        or_none(f, "Aggregator Configuration", &config.aggregator, |f, agg| {
            writeln!(f, "      Path: {}", agg.socket_path)?;
            match agg.socket_permission {
                Some(mode) => writeln!(f, "      Permission: {:o}", mode),
                None => writeln!(f, "      Permission: default"),
            }
        })?;

        writeln!(f, "  System Application: {}", self.system_application)?;
        writeln!(
            f,
            "  Captured Output: {} stdout, {} stderr",
            self.stdout.len(),
            self.stderr.len()
        )?;
        writeln!(f, "  Status: {}", self.status)
    }
}
