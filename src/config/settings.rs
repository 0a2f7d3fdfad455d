//! Configuration settings structures for patent-guard
//!
//! Every section deserializes from TOML and `PATENT_GUARD_*` environment
//! variables; missing keys fall back to the `default_*` functions below.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "patent-guard".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_pool_size() -> u32 {
    20
}

fn default_max_overflow() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_recycle() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_expiration() -> i64 {
    30 // minutes
}

fn default_refresh_token_expiration() -> i64 {
    7 * 24 * 60 // minutes
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_console_format() -> String {
    "full".to_string()
}

fn default_log_path() -> String {
    "logs/app.log".to_string()
}

fn default_file_format() -> String {
    "json".to_string()
}

fn default_max_size() -> u64 {
    500 * 1024 * 1024
}

fn default_max_files() -> usize {
    10
}

fn default_limits() -> Vec<String> {
    vec!["100/minute".to_string(), "1000/hour".to_string()]
}

fn default_route_limits() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("/api/auth/register".to_string(), "5/minute".to_string()),
        ("/api/auth/login".to_string(), "10/minute".to_string()),
    ])
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_pool_size() -> u32 {
    4
}

fn default_redis_connection_timeout() -> u64 {
    5
}

fn default_redis_key_prefix() -> String {
    "patent-guard".to_string()
}

fn default_excluded_paths() -> Vec<String> {
    ["/metrics", "/health", "/docs", "/ping"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    ["pdf", "txt", "doc", "docx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_webhook_tolerance() -> u64 {
    300
}

fn default_currencies() -> Vec<String> {
    ["usd", "eur", "gbp", "jpy", "cny"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_min_amount() -> i64 {
    50
}

fn default_max_amount() -> i64 {
    99_999_999
}

fn default_similarity_limit() -> usize {
    10
}

fn default_similarity_max_limit() -> usize {
    50
}

fn default_similarity_threshold() -> f64 {
    0.1
}

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Origins allowed by CORS; `*` allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl ServerConfig {
    /// Full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            cors_origins: default_cors_origins(),
            max_body_size: default_max_body_size(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// Storage backend for all repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    /// In-process maps; data is lost on restart
    Memory,
}

impl DatabaseBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,

    #[serde(default)]
    pub url: String,

    /// Connections kept open
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Extra connections allowed above `pool_size` under load
    #[serde(default = "default_max_overflow")]
    pub max_overflow: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Seconds after which a connection is recycled
    #[serde(default = "default_recycle")]
    pub recycle: u64,

    /// Health-check connections before handing them out
    #[serde(default = "default_true")]
    pub pre_ping: bool,

    /// Run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: String::new(),
            pool_size: default_pool_size(),
            max_overflow: default_max_overflow(),
            connection_timeout: default_connection_timeout(),
            recycle: default_recycle(),
            pre_ping: true,
            auto_migrate: false,
        }
    }
}

// ============================================================================
// JWT Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret; supply it through `PATENT_GUARD_JWT__SECRET`
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,

    /// Access token lifetime in minutes
    #[serde(default = "default_access_token_expiration")]
    pub access_token_expiration: i64,

    /// Refresh token lifetime in minutes
    #[serde(default = "default_refresh_token_expiration")]
    pub refresh_token_expiration: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: default_jwt_algorithm(),
            access_token_expiration: default_access_token_expiration(),
            refresh_token_expiration: default_refresh_token_expiration(),
        }
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty",
            ));
        }

        if self.secret.len() < 32 {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret should be at least 32 characters",
            ));
        }

        if !self.algorithm.eq_ignore_ascii_case("HS256") {
            return Err(ConfigError::ValidationError {
                field: "jwt.algorithm".to_string(),
                message: format!("Unsupported algorithm '{}', only HS256 is supported", self.algorithm),
            });
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.access_token_expiration",
                "Access token expiration must be positive",
            ));
        }

        if self.refresh_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.refresh_token_expiration",
                "Refresh token expiration must be positive",
            ));
        }

        if self.access_token_expiration >= self.refresh_token_expiration {
            return Err(ConfigError::validation(
                "jwt",
                "Refresh token expiration should be longer than access token expiration",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,

    /// "full", "compact" or "json"
    #[serde(default = "default_console_format")]
    pub format: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
            format: default_console_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// Bytes before the active file is rotated
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    #[serde(default = "default_max_files")]
    pub max_files: usize,

    #[serde(default = "default_true")]
    pub compress: bool,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            max_files: default_max_files(),
            compress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    #[serde(default = "default_file_format")]
    pub format: String,

    #[serde(default)]
    pub rotation: RotationSettings,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: true,
            format: default_file_format(),
            rotation: RotationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Level or `EnvFilter` directive, e.g. "info" or "info,tower_http=debug"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Converts the file representation into the runtime `LoggerConfig`.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(
            self.console.enabled,
            self.console.colored,
            parse_format("logger.console.format", &self.console.format)?,
        );

        let rotation = RotationConfig::new(
            self.file.rotation.max_size,
            self.file.rotation.max_files,
            self.file.rotation.compress,
        )
        .map_err(|e| ConfigError::validation("logger.file.rotation".to_string(), e.to_string()))?;

        let file = FileConfig::new(
            self.file.enabled,
            PathBuf::from(&self.file.path),
            self.file.append,
            parse_format("logger.file.format", &self.file.format)?,
            rotation,
        )
        .map_err(|e| ConfigError::validation("logger.file".to_string(), e.to_string()))?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))
    }
}

fn parse_format(field: &str, value: &str) -> Result<LogFormat, ConfigError> {
    value
        .parse::<LogFormat>()
        .map_err(|e| ConfigError::validation(field.to_string(), e.to_string()))
}

// ============================================================================
// Rate Limit Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: RateLimitBackend,

    /// Limits applied to every route, e.g. ["100/minute", "1000/hour"]
    #[serde(default = "default_limits")]
    pub default_limits: Vec<String>,

    /// Route template → limit, applied in addition to the defaults
    #[serde(default = "default_route_limits")]
    pub routes: BTreeMap<String, String>,

    /// Peers whose `X-Forwarded-For` / `X-Real-IP` headers name the client.
    /// Anyone else is counted by socket address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: RateLimitBackend::default(),
            default_limits: default_limits(),
            routes: default_route_limits(),
            trusted_proxies: Vec::new(),
        }
    }
}

// ============================================================================
// Redis Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,

    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,

    /// Seconds
    #[serde(default = "default_redis_connection_timeout")]
    pub connection_timeout: u64,

    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            connection_timeout: default_redis_connection_timeout(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

// ============================================================================
// Metrics Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path prefixes never recorded
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            excluded_paths: default_excluded_paths(),
        }
    }
}

// ============================================================================
// Storage Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// Lowercase extensions without the dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_file_size: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

// ============================================================================
// Payments Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsConfig {
    /// Shared secret used to sign webhook deliveries
    #[serde(default)]
    pub webhook_secret: String,

    /// Accepted clock skew of the signature timestamp, in seconds
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance: u64,

    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,

    /// Minor units
    #[serde(default = "default_min_amount")]
    pub min_amount: i64,

    /// Minor units
    #[serde(default = "default_max_amount")]
    pub max_amount: i64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            webhook_tolerance: default_webhook_tolerance(),
            currencies: default_currencies(),
            min_amount: default_min_amount(),
            max_amount: default_max_amount(),
        }
    }
}

// ============================================================================
// Similarity Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// JSON patent corpus; the bundled sample corpus is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<String>,

    #[serde(default = "default_similarity_limit")]
    pub default_limit: usize,

    #[serde(default = "default_similarity_max_limit")]
    pub max_limit: usize,

    #[serde(default = "default_similarity_threshold")]
    pub default_threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            corpus_path: None,
            default_limit: default_similarity_limit(),
            max_limit: default_similarity_max_limit(),
            default_threshold: default_similarity_threshold(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub redis: RedisConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub payments: PaymentsConfig,

    #[serde(default)]
    pub similarity: SimilarityConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Strategies
    // ========================================================================

    fn arb_server_config() -> impl Strategy<Value = ServerConfig> {
        (
            prop_oneof![Just("127.0.0.1".to_string()), Just("0.0.0.0".to_string())],
            1u16..=65535u16,
            1u64..=300u64,
            prop::collection::vec("https?://[a-z]{3,10}\\.com", 0..3),
            1024usize..=50_000_000usize,
        )
            .prop_map(
                |(host, port, request_timeout, cors_origins, max_body_size)| {
                    ServerConfig {
                        host,
                        port,
                        request_timeout,
                        cors_origins,
                        max_body_size,
                    }
                },
            )
    }

    fn arb_database_config() -> impl Strategy<Value = DatabaseConfig> {
        (
            prop_oneof![Just(DatabaseBackend::Postgres), Just(DatabaseBackend::Memory)],
            prop_oneof![
                Just("postgres://localhost/patent_guard".to_string()),
                Just("postgresql://user:pass@db:5432/pg".to_string()),
            ],
            1u32..=100u32,
            0u32..=50u32,
            1u64..=120u64,
            any::<bool>(),
        )
            .prop_map(
                |(backend, url, pool_size, max_overflow, connection_timeout, pre_ping)| {
                    DatabaseConfig {
                        backend,
                        url,
                        pool_size,
                        max_overflow,
                        connection_timeout,
                        recycle: 3600,
                        pre_ping,
                        auto_migrate: false,
                    }
                },
            )
    }

    fn arb_jwt_config() -> impl Strategy<Value = JwtConfig> {
        ("[a-zA-Z0-9]{32,64}", 1i64..=120i64, 121i64..=20_160i64).prop_map(
            |(secret, access_token_expiration, refresh_token_expiration)| JwtConfig {
                secret,
                algorithm: "HS256".to_string(),
                access_token_expiration,
                refresh_token_expiration,
            },
        )
    }

    fn arb_rate_limit_config() -> impl Strategy<Value = RateLimitConfig> {
        (
            any::<bool>(),
            prop::collection::vec("[1-9][0-9]{0,3}/(second|minute|hour|day)", 1..3),
            prop::collection::btree_map("/api/[a-z]{3,8}", "[1-9][0-9]{0,2}/minute", 0..3),
        )
            .prop_map(|(enabled, default_limits, routes)| RateLimitConfig {
                enabled,
                backend: RateLimitBackend::Memory,
                default_limits,
                routes,
                trusted_proxies: Vec::new(),
            })
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_server_config(),
            arb_database_config(),
            arb_jwt_config(),
            arb_rate_limit_config(),
            any::<bool>(),
        )
            .prop_map(|(server, database, jwt, rate_limit, metrics_enabled)| Settings {
                server,
                database,
                jwt,
                rate_limit,
                metrics: MetricsConfig {
                    enabled: metrics_enabled,
                    ..MetricsConfig::default()
                },
                ..Settings::default()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_settings_round_trip_through_toml(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings).expect("serialize");
            let back: Settings = toml::from_str(&toml_str).expect("deserialize");
            prop_assert_eq!(settings, back);
        }
    }

    // ========================================================================
    // Unit tests
    // ========================================================================

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.database.pool_size, 20);
        assert_eq!(settings.database.max_overflow, 10);
        assert_eq!(settings.database.recycle, 3600);
        assert_eq!(settings.jwt.access_token_expiration, 30);
        assert_eq!(settings.jwt.refresh_token_expiration, 10_080);
        assert_eq!(settings.rate_limit.default_limits, vec!["100/minute", "1000/hour"]);
        assert_eq!(
            settings.rate_limit.routes.get("/api/auth/register").map(String::as_str),
            Some("5/minute")
        );
        assert_eq!(settings.payments.webhook_tolerance, 300);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
[server]
port = 9000

[database]
backend = "memory"
"#,
        )
        .unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.database.backend, DatabaseBackend::Memory);
        assert!(settings.metrics.enabled);
    }

    #[test]
    fn test_jwt_validation() {
        let mut jwt = JwtConfig {
            secret: "a".repeat(32),
            ..JwtConfig::default()
        };
        assert!(jwt.validate().is_ok());

        jwt.secret = "short".into();
        assert!(matches!(
            jwt.validate(),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "jwt.secret"
        ));

        jwt.secret = "b".repeat(40);
        jwt.access_token_expiration = 20_000;
        assert!(jwt.validate().is_err());

        jwt.access_token_expiration = 30;
        jwt.algorithm = "RS256".into();
        assert!(jwt.validate().is_err());
    }

    #[test]
    fn test_logger_settings_conversion() {
        let settings = LoggerSettings {
            level: "debug".into(),
            console: ConsoleSettings {
                format: "json".into(),
                ..ConsoleSettings::default()
            },
            ..LoggerSettings::default()
        };
        let config = settings.into_logger_config().unwrap();
        assert_eq!(config.console.format, LogFormat::Json);
        assert_eq!(config.file.format, LogFormat::Json);
        assert!(!config.file.enabled);
    }

    #[test]
    fn test_logger_settings_rejects_unknown_format() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                format: "yaml".into(),
                ..ConsoleSettings::default()
            },
            ..LoggerSettings::default()
        };
        assert!(matches!(
            settings.into_logger_config(),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "logger.console.format"
        ));
    }

    #[test]
    fn test_server_address() {
        let server = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(server.address(), "0.0.0.0:8080");
    }
}
