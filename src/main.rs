use std::process::ExitCode;

use clap::Parser;
use patent_guard::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let environment = cli.environment();

    let settings = match load_and_merge_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logger_from_settings(&settings) {
        eprintln!("Failed to initialize logger: {e:#}");
        return ExitCode::FAILURE;
    }

    match execute_command(&cli, settings, environment).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
