//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading suite configuration
//! from defaults, files, `.env` files and environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use kanon_core::{ContentType, LogDetail};
use serde_json::Value;

use crate::{ConfigError, KanonConfig, LogFormat};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones, key by key:
/// 1. Default values (or a preset)
/// 2. Configuration files and strings (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use kanon_config::ConfigLoader;
///
/// # fn main() -> Result<(), kanon_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("kanon.toml")?
///     .with_dotenv()?
///     .with_env_prefix("KANON")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: KanonConfig,
    env_prefix: Option<String>,
    files_loaded: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: KanonConfig::default(),
            env_prefix: None,
            files_loaded: Vec::new(),
        }
    }

    /// Start with the development preset.
    ///
    /// ```
    /// use kanon_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = KanonConfig::development();
        self
    }

    /// Start with the CI preset.
    #[must_use]
    pub fn with_ci(mut self) -> Self {
        self.config = KanonConfig::ci();
        self
    }

    /// Layer a configuration file. The format follows the extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// or contains unknown keys.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let layer = Self::parse_file(&content, path)?;
        self.merge_layer(layer)?;
        self.files_loaded.push(path.to_path_buf());
        Ok(self)
    }

    /// Layer a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Layer configuration from a string in the given format
    /// (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use kanon_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [client]
    ///     base_url = "https://reqres.in"
    ///     base_path = "/api"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.client.base_path.as_deref(), Some("/api"));
    /// assert_eq!(config.client.timeout_ms, 30_000);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer = match format.to_lowercase().as_str() {
            "toml" => toml::from_str::<Value>(content)?,
            "json" => serde_json::from_str::<Value>(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        self.merge_layer(layer)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `KANON__CLIENT__BASE_URL=https://staging.reqres.in`. They are read
    /// when [`load`](Self::load) runs.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load `.env` from the working directory into the process environment.
    /// A missing file is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific dotenv file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or malformed.
    pub fn with_dotenv_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Apply overrides from explicit `(name, value)` pairs instead of the
    /// process environment. Names use the same `PREFIX__SECTION__KEY` form.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvParseError` for a malformed value.
    pub fn with_vars<I, K, V>(mut self, prefix: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let prefix = prefix.to_uppercase();
        for (key, value) in vars {
            if key.as_ref().starts_with(&prefix) {
                self.apply_env_var(key.as_ref(), value.as_ref(), &prefix)?;
            }
        }
        Ok(self)
    }

    /// Files layered so far, in order.
    pub fn files_loaded(&self) -> &[PathBuf] {
        &self.files_loaded
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// validation fails.
    pub fn load(mut self) -> Result<KanonConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self = self.with_vars(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Finalize without validation.
    #[must_use]
    pub fn load_unvalidated(self) -> KanonConfig {
        self.config
    }

    // Parse configuration file based on extension
    fn parse_file(content: &str, path: &Path) -> Result<Value, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // Overlay a parsed layer on the current configuration, key by key
    fn merge_layer(&mut self, layer: Value) -> Result<(), ConfigError> {
        let mut current = serde_json::to_value(&self.config)?;
        deep_merge(&mut current, layer);
        self.config = serde_json::from_value(current)?;
        Ok(())
    }

    // Apply a single environment variable
    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let client = &mut self.config.client;
        let telemetry = &mut self.config.telemetry;

        match parts.as_slice() {
            // Suite section
            ["SUITE", "NAME"] => self.config.suite.name = value.to_string(),
            ["SUITE", "ENVIRONMENT"] => self.config.suite.environment = value.to_string(),

            // Client section
            ["CLIENT", "BASE_URL"] => client.base_url = non_empty(value),
            ["CLIENT", "BASE_PATH"] => client.base_path = non_empty(value),
            ["CLIENT", "BEARER_TOKEN"] => client.bearer_token = non_empty(value),
            ["CLIENT", "TIMEOUT_MS"] => {
                client.timeout_ms = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["CLIENT", "CONNECT_TIMEOUT_MS"] => {
                client.connect_timeout_ms = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["CLIENT", "CONTENT_TYPE"] => {
                client.content_type = match value.to_lowercase().as_str() {
                    "json" => ContentType::Json,
                    "form" => ContentType::Form,
                    "text" => ContentType::Text,
                    "none" => ContentType::None,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json', 'form', 'text', or 'none'",
                        ))
                    }
                };
            }
            ["CLIENT", "LOG"] => {
                client.log = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| parse_log_detail(s).ok_or_else(|| {
                        ConfigError::env_parse_error(key, format!("unknown log detail '{s}'"))
                    }))
                    .collect::<Result<_, _>>()?;
            }
            ["CLIENT", "HEADERS", name] => {
                client
                    .headers
                    .insert(name.to_lowercase().replace('_', "-"), value.to_string());
            }

            // Telemetry logging
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => telemetry.logging.level = value.to_string(),
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            // Telemetry metrics
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unknown key - ignore
            _ => {}
        }

        Ok(())
    }
}

fn deep_merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_log_detail(s: &str) -> Option<LogDetail> {
    match s.to_lowercase().as_str() {
        "uri" => Some(LogDetail::Uri),
        "body" => Some(LogDetail::Body),
        "headers" => Some(LogDetail::Headers),
        "status" => Some(LogDetail::Status),
        "all" => Some(LogDetail::All),
        _ => None,
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
