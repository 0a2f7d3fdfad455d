//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};
use crate::error::AppResult;

/// Runs the selected command to completion; for `serve` that is until
/// shutdown.
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> AppResult<()> {
    match cli.command() {
        Commands::Serve { dry_run, .. } => {
            ServeCommandHandler::new(settings, environment)
                .execute(dry_run)
                .await
        }
        Commands::Migrate { dry_run, rollback } => {
            if let Some(steps) = rollback {
                tracing::warn!(steps, "Rolling back migrations; data in reverted tables is lost");
            }
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseBackend;
    use clap::Parser;

    #[tokio::test]
    async fn test_serve_dry_run_dispatch() {
        let cli = Cli::try_parse_from(["patent-guard", "serve", "--dry-run"]).unwrap();
        let mut settings = Settings::default();
        settings.database.backend = DatabaseBackend::Memory;
        settings.jwt.secret = "a-test-secret-that-is-at-least-32-chars".to_string();
        assert!(
            execute_command(&cli, settings, Environment::Test)
                .await
                .is_ok()
        );
    }
}
