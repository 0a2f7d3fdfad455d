//! Configuration management
//!
//! Layered TOML files plus `PATENT_GUARD_*` environment overrides, see
//! [`ConfigLoader`] for the precedence rules.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    DatabaseBackend, DatabaseConfig, JwtConfig, MetricsConfig, PaymentsConfig, RateLimitBackend,
    RateLimitConfig, RedisConfig, ServerConfig, Settings, SimilarityConfig, StorageConfig,
};
