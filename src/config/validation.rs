//! Configuration validation
//!
//! Each section checks its own invariants; `Settings::validate` runs them
//! all and reports the first offending dotted field.

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseBackend, DatabaseConfig, LoggerSettings, PaymentsConfig, RateLimitConfig,
    ServerConfig, Settings, SimilarityConfig, StorageConfig,
};
use crate::rate_limit::RateLimit;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const POSTGRES_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535",
            ));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "Maximum body size must be greater than 0 bytes",
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Only the postgres backend needs a URL and pool settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == DatabaseBackend::Memory {
            return Ok(());
        }

        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required for the postgres backend",
            ));
        }
        if !POSTGRES_SCHEMES.iter().any(|s| self.url.starts_with(s)) {
            return Err(ConfigError::validation(
                "database.url",
                "Expected postgres://[user:password@]host[:port]/database",
            ));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::validation(
                "database.pool_size",
                "Pool size must be at least 1",
            ));
        }
        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds",
            ));
        }
        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let head = self.level.split(',').next().unwrap_or_default().trim();
        if !VALID_LOG_LEVELS.contains(&head.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        for (field, format) in [
            ("logger.console.format", &self.console.format),
            ("logger.file.format", &self.file.format),
        ] {
            if !VALID_LOG_FORMATS.contains(&format.to_lowercase().as_str()) {
                return Err(ConfigError::validation(
                    field,
                    format!(
                        "Invalid log format '{}'. Valid formats are: {}",
                        format,
                        VALID_LOG_FORMATS.join(", ")
                    ),
                ));
            }
        }

        if self.file.enabled && self.file.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled",
            ));
        }
        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled",
            ));
        }
        Ok(())
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for limit in &self.default_limits {
            limit.parse::<RateLimit>().map_err(|e| {
                ConfigError::validation("rate_limit.default_limits", e.to_string())
            })?;
        }
        for (route, limit) in &self.routes {
            if !route.starts_with('/') {
                return Err(ConfigError::validation(
                    "rate_limit.routes",
                    format!("Route '{route}' must start with '/'"),
                ));
            }
            limit.parse::<RateLimit>().map_err(|e| {
                ConfigError::validation(format!("rate_limit.routes.{route}"), e.to_string())
            })?;
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.trim().is_empty() {
            return Err(ConfigError::validation(
                "storage.upload_dir",
                "Upload directory cannot be empty",
            ));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::validation(
                "storage.max_file_size",
                "Maximum file size must be greater than 0 bytes",
            ));
        }
        Ok(())
    }
}

impl PaymentsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_tolerance == 0 {
            return Err(ConfigError::validation(
                "payments.webhook_tolerance",
                "Webhook tolerance must be greater than 0 seconds",
            ));
        }
        if self.currencies.is_empty() {
            return Err(ConfigError::validation(
                "payments.currencies",
                "At least one currency must be accepted",
            ));
        }
        if self.min_amount <= 0 || self.min_amount > self.max_amount {
            return Err(ConfigError::validation(
                "payments.min_amount",
                format!(
                    "Amount bounds must satisfy 0 < min_amount ({}) <= max_amount ({})",
                    self.min_amount, self.max_amount
                ),
            ));
        }
        Ok(())
    }
}

impl SimilarityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::validation(
                "similarity.default_limit",
                format!("Default limit must be between 1 and max_limit ({})", self.max_limit),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(ConfigError::validation(
                "similarity.default_threshold",
                "Threshold must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        self.rate_limit.validate()?;
        self.storage.validate()?;
        self.payments.validate()?;
        self.similarity.validate()?;
        Ok(())
    }

    /// [`validate`](Self::validate) plus what only production forbids.
    pub fn validate_for(&self, environment: Environment) -> Result<(), ConfigError> {
        self.validate()?;
        if !environment.is_production() {
            return Ok(());
        }
        if self.database.backend == DatabaseBackend::Memory {
            return Err(ConfigError::validation(
                "database.backend",
                "The memory backend is not allowed in production",
            ));
        }
        if self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(ConfigError::validation(
                "server.cors_origins",
                "Wildcard CORS origins are not allowed in production",
            ));
        }
        Ok(())
    }
}
