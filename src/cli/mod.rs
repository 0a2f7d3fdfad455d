//! Command-line interface
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args over files and environment)
//! - Command handlers for `serve` and `migrate`

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use crate::config::Settings;
use crate::logger::init_logger;

/// Loads configuration for the selected environment and applies the CLI
/// overrides; the result is validated.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::load(cli, cli.environment())?;
    Ok(merger.merge_cli_args(cli)?)
}

/// Installs the global tracing subscriber from the `[logger]` section.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config)?;
    Ok(())
}
