//! statekeep - inspect a supervised application's persisted state.
//!
//! # Execution Flow
//!
//! 1. Load the layered [`AppConfig`](statekeep::AppConfig) from the config directory.
//!    Logging is not up yet, so this step reports only through its error.
//! 2. Initialize logging → `<log-dir>/statekeep.<date>`, level from the config
//! 3. Resolve the state file: the positional argument, or `/tmp/.<app_name>.state`
//! 4. Load the state and print it

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use statekeep::{APP_NAME, ConfigManager, StatePersistence, VERSION};

#[derive(Parser)]
#[command(
    name = "statekeep",
    version,
    about = "Print the persisted state of a supervised application."
)]
struct Cli {
    /// State file to read (defaults to /tmp/.<app_name>.state).
    state_file: Option<Utf8PathBuf>,

    /// Directory holding Settings.* files.
    #[arg(long, default_value = ".")]
    config_dir: Utf8PathBuf,

    /// Run mode selecting Settings.<mode>.* (defaults to $RUN_MODE or "development").
    #[arg(long)]
    run_mode: Option<String>,

    /// Directory for rotating log files.
    #[arg(long, default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Also log to the console.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let run_mode = cli
        .run_mode
        .unwrap_or_else(ConfigManager::run_mode_from_env);
    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let config = config_manager.load_app_config(&run_mode)?;

    let _guard = statekeep::logging::setup_logging(
        cli.log_dir.as_str(),
        APP_NAME,
        statekeep::logging::filter_directive(&config),
        cli.verbose,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Using config for {} from {} (run mode: {}, environment: {})",
        config.app_name,
        config_manager.config_dir(),
        run_mode,
        config.environment
    );

    if let Err(err) = config.validate() {
        tracing::warn!("Configuration for {} is incomplete: {}", config.app_name, err);
    }

    let state_path = cli
        .state_file
        .unwrap_or_else(|| StatePersistence::state_path(&config));

    let state = StatePersistence::load_state(&state_path)
        .with_context(|| format!("Failed to load state for {}", config.app_name))?;

    print!("{}", state);

    tracing::info!("Printed state from {}", state_path);
    Ok(())
}
