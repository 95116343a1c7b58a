use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for an application's config.
///
/// `debug_mode` forces `"debug"`. Otherwise the `log_level` label is used when
/// it names a tracing level, falling back to `"info"`.
pub fn filter_directive(config: &AppConfig) -> &'static str {
    if config.debug_mode {
        return "debug";
    }

    match config.tracing_level() {
        Some(tracing::Level::ERROR) => "error",
        Some(tracing::Level::WARN) => "warn",
        Some(tracing::Level::DEBUG) => "debug",
        Some(tracing::Level::TRACE) => "trace",
        _ => "info",
    }
}

/// Setup logging with a daily rotating file appender and optional console output.
///
/// # Arguments
/// * `log_dir` - Directory for log files (e.g., "logs")
/// * `log_prefix` - Prefix for log files (e.g., "statekeep")
/// * `directive` - `EnvFilter` directive, usually from [`filter_directive`]
/// * `console_output` - If true, also log to the console
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(
    log_dir: &str,
    log_prefix: &str,
    directive: &str,
    console_output: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_path = Utf8PathBuf::from(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(&log_path)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter directive: {}", directive))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // Optional layers are no-ops when None
    let console_layer = console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, filter={}, console={}",
        log_dir,
        log_prefix,
        directive,
        console_output
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filter_directive() {
        let mut config = AppConfig::default();
        assert_eq!(filter_directive(&config), "info");

        config.log_level = "Trace".to_string();
        assert_eq!(filter_directive(&config), "trace");

        config.log_level = "Error".to_string();
        assert_eq!(filter_directive(&config), "error");

        config.log_level = "nonsense".to_string();
        assert_eq!(filter_directive(&config), "info");

        config.debug_mode = true;
        assert_eq!(filter_directive(&config), "debug");
    }

    #[test]
    fn test_setup_logging_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let log_dir_str = log_dir.to_str().unwrap();

        // May fail if another test already installed a global subscriber,
        // but the directory is created either way
        let _result = setup_logging(log_dir_str, "test", "info", false);

        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_invalid_directive_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir_str = temp_dir.path().to_str().unwrap();

        let result = setup_logging(log_dir_str, "test", "statekeep=loudest", false);
        assert!(result.is_err());
    }
}
