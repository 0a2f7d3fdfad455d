//! Layered configuration loading
//!
//! Sources, lowest priority first:
//! 1. `default.toml` (required)
//! 2. `{environment}.toml`
//! 3. `local.toml`
//! 4. `PATENT_GUARD_*` environment variables

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

pub const CONFIG_DIR_ENV: &str = "PATENT_GUARD_CONFIG_DIR";

pub const CONFIG_FILE_ENV: &str = "PATENT_GUARD_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "PATENT_GUARD";

/// `PATENT_GUARD_DATABASE__URL` → `database.url`
const ENV_SEPARATOR: &str = "__";

/// Keys whose environment value is a comma-separated list
const LIST_KEYS: &[&str] = &[
    "server.cors_origins",
    "rate_limit.default_limits",
    "metrics.excluded_paths",
    "storage.allowed_extensions",
    "payments.currencies",
];

#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped and only this file is read
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Reads `PATENT_GUARD_CONFIG_DIR`, `PATENT_GUARD_CONFIG_FILE` and
    /// `PATENT_GUARD_APP_ENV`. The first two are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_env = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_env.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{CONFIG_DIR_ENV} and {CONFIG_FILE_ENV} cannot both be set. \
                 Use {CONFIG_DIR_ENV} for layered configuration or \
                 {CONFIG_FILE_ENV} for a single configuration file."
            )));
        }

        Ok(Self {
            config_dir: config_dir_env
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Single-file loader, used by `--config`.
    pub fn from_file(path: impl Into<PathBuf>, environment: AppEnvironment) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment,
        }
    }

    /// Overrides the environment picked up from `PATENT_GUARD_APP_ENV`.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads, deserializes and validates the settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings: Settings = self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();
        let builder = match &self.config_file {
            Some(file) => add_file_source(builder, file, true)?,
            None => self.build_layered_config(builder)?,
        };
        add_env_source(builder).build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = add_file_source(builder, &self.config_dir.join("default.toml"), true)?;
        let env_file = self
            .config_dir
            .join(self.environment.config_file());
        let builder = add_file_source(builder, &env_file, false)?;
        add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }
    let name = path.to_string_lossy().into_owned();
    Ok(builder.add_source(File::new(&name, FileFormat::Toml).required(required)))
}

fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    let env = LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .ignore_empty(true)
            .try_parsing(true),
        |env, key| env.with_list_parse_key(key),
    );
    builder.add_source(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests in this module mutate process-wide environment variables
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        for (name, content) in files {
            fs::write(dir.path().join(name), content).expect("write config");
        }
        dir
    }

    /// Restores touched variables on drop.
    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { saved: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.saved.push((key.to_string(), std::env::var(key).ok()));
            unsafe { std::env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            self.saved.push((key.to_string(), std::env::var(key).ok()));
            unsafe { std::env::remove_var(key) };
        }

        fn clear_loader_vars(&mut self) {
            self.remove(CONFIG_DIR_ENV);
            self.remove(CONFIG_FILE_ENV);
            self.remove(AppEnvironment::ENV_VAR);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.saved.iter().rev() {
                unsafe {
                    match value {
                        Some(v) => std::env::set_var(key, v),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    const DEFAULT_TOML: &str = r#"
[application]
name = "patent-guard-test"
version = "1.0.0"

[server]
host = "127.0.0.1"
port = 8000

[database]
backend = "memory"

[jwt]
secret = "0123456789abcdef0123456789abcdef"
"#;

    #[test]
    fn test_new_uses_defaults() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let loader = ConfigLoader::new().unwrap();
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_dir_and_file_are_mutually_exclusive() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/etc/patent-guard");
        env.set(CONFIG_FILE_ENV, "/etc/patent-guard/app.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains(CONFIG_DIR_ENV));
                assert!(msg.contains(CONFIG_FILE_ENV));
            }
            other => panic!("expected MutualExclusivityError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_default_toml() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        let dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());

        match ConfigLoader::new().unwrap().load() {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_layers_override_in_order() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        let dir = setup_config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("production.toml", "[server]\nhost = \"0.0.0.0\"\nport = 9000\n"),
            ("local.toml", "[server]\nport = 9100\n"),
        ]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        env.set(AppEnvironment::ENV_VAR, "production");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.application.name, "patent-guard-test");
    }

    #[test]
    fn test_environment_variables_win() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        let dir = setup_config_dir(&[("default.toml", DEFAULT_TOML)]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        env.set("PATENT_GUARD_SERVER__PORT", "8123");
        env.set(
            "PATENT_GUARD_SERVER__CORS_ORIGINS",
            "https://a.example,https://b.example",
        );
        env.set("PATENT_GUARD_RATE_LIMIT__ENABLED", "false");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.server.port, 8123);
        assert_eq!(
            settings.server.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!settings.rate_limit.enabled);
    }

    #[test]
    fn test_single_file_mode() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        let dir = setup_config_dir(&[("custom.toml", DEFAULT_TOML)]);

        let loader = ConfigLoader::from_file(dir.path().join("custom.toml"), AppEnvironment::Test);
        let settings = loader.load().unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(loader.environment(), AppEnvironment::Test);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        let dir = setup_config_dir(&[(
            "default.toml",
            "[database]\nbackend = \"memory\"\n[rate_limit]\ndefault_limits = [\"lots\"]\n",
        )]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());

        assert!(matches!(
            ConfigLoader::new().unwrap().load(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_shipped_default_toml_parses() {
        let raw = include_str!("../../config/default.toml");
        let settings: Settings = toml::from_str(raw).expect("config/default.toml must deserialize");
        assert_eq!(settings.application.name, "patent-guard");
    }
}
