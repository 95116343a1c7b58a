use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File};
use std::fs;

/// Base name of the settings files, without extension.
pub const SETTINGS_NAME: &str = "Settings";

/// Prefix for environment overrides, e.g. `APP_DEBUG_MODE=true`.
pub const ENV_PREFIX: &str = "APP";

/// Run mode used when `RUN_MODE` is not set.
pub const DEFAULT_RUN_MODE: &str = "development";

/// Configuration manager for loading and saving [`AppConfig`].
///
/// Sources are layered, later ones winning:
/// 1. Built-in defaults for the scalar fields
/// 2. `Settings.<ext>` in the config directory (any format the `config` crate reads)
/// 3. `Settings.<run_mode>.<ext>`
/// 4. `APP_*` environment variables, `__` separating nested keys
///    (`APP_GIT__DEFAULT_SERVER=GitLab`)
///
/// The `git`, `database` and `aggregator` sections have no defaults, so they
/// stay unset unless some layer provides them.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    /// Replaces the process environment as the `APP_*` source when set
    env_source: Option<::config::Map<String, String>>,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(format!("{}.json", SETTINGS_NAME)),
            config_dir,
            env_source: None,
        })
    }

    /// Read `APP_*` overrides from `vars` instead of the process environment.
    pub fn with_environment(mut self, vars: ::config::Map<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    /// The run mode named by `RUN_MODE`, or `"development"` when unset or blank.
    pub fn run_mode_from_env() -> String {
        run_mode_or_default(std::env::var("RUN_MODE").ok())
    }

    /// Save `config` as `Settings.json` in the config directory.
    pub fn save_app_config(&self, config: &AppConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)
            .context("Failed to serialize app config to JSON")?;

        fs::write(&self.settings_path, json)
            .with_context(|| format!("Failed to write app config: {}", self.settings_path))?;

        tracing::info!("Saved app config to {}", self.settings_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Path `save_app_config` writes to.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    /// Load the layered application config for `run_mode`.
    ///
    /// Environment values stay strings until deserialization, so a value like
    /// `APP_APP_NAME=007` keeps its leading zeros while `APP_DEBUG_MODE=true`
    /// still lands in the bool field.
    pub fn load_app_config(&self, run_mode: &str) -> Result<AppConfig> {
        let base = self.config_dir.join(SETTINGS_NAME);
        let mode = self.config_dir.join(format!("{}.{}", SETTINGS_NAME, run_mode));

        let settings = Config::builder()
            .set_default("app_name", "MyApp")?
            .set_default("max_ram_usage", 0)?
            .set_default("max_cpu_usage", 0)?
            .set_default("environment", run_mode)?
            .set_default("debug_mode", false)?
            .set_default("log_level", "Info")?
            .add_source(File::with_name(base.as_str()).required(false))
            .add_source(File::with_name(mode.as_str()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(self.env_source.clone()),
            )
            .build()
            .with_context(|| format!("Failed to read settings from {}", self.config_dir))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings from {}", self.config_dir))?;

        tracing::info!(
            "Loaded app config for {} (run mode: {})",
            config.app_name,
            run_mode
        );
        Ok(config)
    }
}

fn run_mode_or_default(value: Option<String>) -> String {
    match value {
        Some(mode) if !mode.trim().is_empty() => mode,
        _ => DEFAULT_RUN_MODE.to_string(),
    }
}
