//! Migrate command handler
//!
//! Applies, previews or rolls back the embedded migrations.

use crate::config::{DatabaseBackend, Settings};
use crate::db::{MigrationAction, run_migrations};
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// `--dry-run` and `--rollback` are mutually exclusive at the parser.
    pub fn action(dry_run: bool, rollback: Option<u32>) -> MigrationAction {
        match (dry_run, rollback) {
            (true, _) => MigrationAction::DryRun,
            (false, Some(steps)) => MigrationAction::Rollback(steps),
            (false, None) => MigrationAction::Apply,
        }
    }

    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        if self.config.database.backend == DatabaseBackend::Memory {
            return Err(AppError::Configuration {
                key: "database.backend".to_string(),
                source: anyhow::anyhow!("migrations require the postgres backend"),
            });
        }
        self.config.database.validate()?;

        let action = Self::action(dry_run, rollback);
        tracing::info!(?action, "Running migrations");
        let names = run_migrations(&self.config.database.url, action).await?;

        match action {
            MigrationAction::DryRun if names.is_empty() => {
                println!("✓ No pending migrations - database is up to date");
            }
            MigrationAction::DryRun => {
                println!("Found {} pending migration(s):", names.len());
                names.iter().for_each(|name| println!("  - {name}"));
                println!("\nRun without --dry-run to apply them");
            }
            MigrationAction::Apply if names.is_empty() => {
                println!("✓ No pending migrations - database is up to date");
            }
            MigrationAction::Apply => {
                println!("✓ Applied {} migration(s):", names.len());
                names.iter().for_each(|name| println!("  - {name}"));
            }
            MigrationAction::Rollback(_) => {
                println!("✓ Rolled back {} migration(s):", names.len());
                names.iter().for_each(|name| println!("  - {name}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_selection() {
        assert_eq!(MigrateCommandHandler::action(false, None), MigrationAction::Apply);
        assert_eq!(MigrateCommandHandler::action(true, None), MigrationAction::DryRun);
        assert_eq!(
            MigrateCommandHandler::action(false, Some(2)),
            MigrationAction::Rollback(2)
        );
    }

    #[tokio::test]
    async fn test_memory_backend_has_nothing_to_migrate() {
        let mut config = Settings::default();
        config.database.backend = DatabaseBackend::Memory;
        let result = MigrateCommandHandler::new(config).execute(false, None).await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_missing_url_is_rejected_before_connecting() {
        let mut config = Settings::default();
        config.database.backend = DatabaseBackend::Postgres;
        config.database.url = String::new();
        let result = MigrateCommandHandler::new(config).execute(true, None).await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
