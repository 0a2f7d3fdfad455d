//! Serve command handler
//!
//! Either validates the configuration (`--dry-run`) or runs the server.

use crate::config::{DatabaseBackend, Environment, Settings};
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }
        Server::new(self.config, self.environment).run().await
    }

    /// Checks everything the server would check at startup without binding
    /// or connecting.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate_for(self.environment)?;
        self.config.jwt.validate()?;

        println!("✓ Configuration is valid ({} environment)", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());
        match self.config.database.backend {
            DatabaseBackend::Postgres => println!("✓ Database URL is configured"),
            DatabaseBackend::Memory => println!("! Using the in-memory backend"),
        }
        if self.config.payments.webhook_secret.is_empty() {
            println!("! payments.webhook_secret is empty; webhooks will be rejected");
        }
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
