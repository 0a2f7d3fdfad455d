//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;

/// Patent similarity checking API server
#[derive(Parser, Debug)]
#[command(name = "patent-guard")]
#[command(about = "Patent similarity checking API server")]
#[command(long_about = "
Patent Guard serves the HTTP API for document uploads, similarity checks
against a patent corpus, and payments.

EXAMPLES:
    # Start the server with default configuration
    patent-guard serve

    # Start server on custom host and port
    patent-guard serve --host 0.0.0.0 --port 8080

    # Use a single configuration file
    patent-guard --config /etc/patent-guard/production.toml serve

    # Run in development mode with verbose logging
    patent-guard --env development --verbose serve

    # Check configuration without starting server
    patent-guard serve --dry-run

    # Apply, preview or roll back database migrations
    patent-guard migrate
    patent-guard migrate --dry-run
    patent-guard migrate --rollback 2

Environment variables prefixed with PATENT_GUARD_ override file values,
e.g. PATENT_GUARD_DATABASE__URL.
")]
#[command(version = build::PKG_VERSION, long_version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute; `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load only this TOML file instead of the layered `config/` directory.
    /// Environment variable overrides still apply.
    #[arg(short, long, global = true, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection (PATENT_GUARD_APP_ENV)
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web server (default)
    ///
    /// Examples:
    ///   patent-guard serve                            # Start with defaults
    ///   patent-guard serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   patent-guard serve --dry-run                  # Validate config without starting
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override; wins over --verbose and --quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    ///
    /// Examples:
    ///   patent-guard migrate                 # Apply all pending migrations
    ///   patent-guard migrate --dry-run       # Show pending migrations without applying
    ///   patent-guard migrate --rollback 3    # Roll back the last 3 migrations
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of migrations to roll back (1-100)
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl Cli {
    /// `--env` if given, otherwise `PATENT_GUARD_APP_ENV`.
    pub fn environment(&self) -> crate::config::Environment {
        self.env
            .map(Into::into)
            .unwrap_or_else(crate::config::Environment::from_env)
    }

    /// The subcommand to run; a bare invocation serves.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
            log_level: None,
            dry_run: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        <Cli as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["patent-guard", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_bare_invocation_serves() {
        let cli = Cli::try_parse_from(["patent-guard"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command(),
            Commands::Serve { dry_run: false, .. }
        ));
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "patent-guard",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-level",
            "debug",
        ])
        .unwrap();
        match cli.command() {
            Commands::Serve {
                host,
                port,
                log_level,
                dry_run,
            } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert_eq!(log_level, Some(LogLevel::Debug));
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["patent-guard", "migrate", "--env", "prod", "-q"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
        assert!(cli.quiet);
        assert_eq!(cli.environment(), crate::config::Environment::Production);
    }

    #[test]
    fn test_migrate_flags_conflict() {
        let err = Cli::try_parse_from(["patent-guard", "migrate", "--dry-run", "--rollback", "1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_rollback_bounds() {
        assert!(Cli::try_parse_from(["patent-guard", "migrate", "--rollback", "0"]).is_err());
        let cli = Cli::try_parse_from(["patent-guard", "migrate", "--rollback", "3"]).unwrap();
        assert!(matches!(
            cli.command(),
            Commands::Migrate {
                dry_run: false,
                rollback: Some(3)
            }
        ));
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["patent-guard", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
