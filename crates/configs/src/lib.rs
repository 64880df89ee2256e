//! # configs
//!
//! Typed application configuration. Sources, lowest precedence first:
//! built-in defaults, `complaint-desk.toml` (path overridable through
//! `DESK_CONFIG`), `.env`, then `DESK__*` environment variables with `__`
//! separating nested keys (e.g. `DESK__STORAGE__BACKEND=sqlite`).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use domains::Actor;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "complaint-desk.toml";
pub const CONFIG_FILE_VAR: &str = "DESK_CONFIG";
pub const ENV_PREFIX: &str = "DESK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "StorageConfig::default_database_url")]
    pub database_url: SecretString,
}

impl StorageConfig {
    fn default_database_url() -> SecretString {
        SecretString::from("sqlite://complaint-desk.db".to_string())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: Self::default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `services=debug,info`.
    #[serde(default = "LoggingConfig::default_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Actors the session directory knows about.
    #[serde(default)]
    pub roster: Vec<Actor>,
}

impl AppConfig {
    /// Loads `.env`, then the config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let file = std::env::var(CONFIG_FILE_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let builder = Config::builder()
            .add_source(File::from(Path::new(&file)).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));
        Self::finish(builder.build()?)
    }

    /// Builds from a TOML document with optional environment overrides.
    /// Process environment is not consulted.
    pub fn from_toml(toml: &str, env: HashMap<String, String>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(Some(env)),
            )
            .build()?;
        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.database_url.expose_secret().trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage.database_url is required for the sqlite backend".into(),
            ));
        }

        let mut seen = HashSet::new();
        for actor in &self.roster {
            if !seen.insert(actor.id) {
                return Err(ConfigError::Invalid(format!("duplicate roster id {}", actor.id)));
            }
            if actor.display_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("roster entry {} has no display_name", actor.id)));
            }
        }
        Ok(())
    }
}
