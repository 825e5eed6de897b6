//! Harness-wide defaults loaded from files and the environment.
//!
//! A test suite can keep a `skiff.toml` next to its sources, or export
//! `SKIFF__*` variables in CI, to tune every broker it builds without touching
//! test code. Loaded settings are applied to a builder with
//! [`BrokerConfigBuilder::apply_settings`](crate::BrokerConfigBuilder::apply_settings).
//!
//! ```toml
//! socket_timeout_ms = 3000
//! controlled_shutdown = true
//! rack = "r1"
//! coordination_endpoint = "localhost:2181"
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SettingsError;

/// Optional overrides for builder defaults.
///
/// Unset fields leave the builder untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSettings {
    /// Replica and controller socket timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_timeout_ms: Option<u64>,

    /// Enable controlled shutdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controlled_shutdown: Option<bool>,

    /// Backoff between controlled shutdown attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controlled_shutdown_retry_backoff_ms: Option<u64>,

    /// Allow topic deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_topic: Option<bool>,

    /// Run the background log cleaner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_cleaner: Option<bool>,

    /// Log cleaner deduplication buffer size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_cleaner_dedupe_buffer_size: Option<u64>,

    /// Rack id for every broker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,

    /// Coordination service connection string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordination_endpoint: Option<String>,

    /// Log filter for the test subscriber. Not applied by the builder;
    /// `skiff_test::init_logging_from_settings` reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl HarnessSettings {
    // Later layers win field by field.
    fn merge(&mut self, other: Self) {
        overlay(&mut self.socket_timeout_ms, other.socket_timeout_ms);
        overlay(&mut self.controlled_shutdown, other.controlled_shutdown);
        overlay(
            &mut self.controlled_shutdown_retry_backoff_ms,
            other.controlled_shutdown_retry_backoff_ms,
        );
        overlay(&mut self.delete_topic, other.delete_topic);
        overlay(&mut self.log_cleaner, other.log_cleaner);
        overlay(
            &mut self.log_cleaner_dedupe_buffer_size,
            other.log_cleaner_dedupe_buffer_size,
        );
        overlay(&mut self.rack, other.rack);
        overlay(&mut self.coordination_endpoint, other.coordination_endpoint);
        overlay(&mut self.log_level, other.log_level);
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Layered loader for [`HarnessSettings`].
///
/// Layers apply in call order and the environment (if a prefix was set)
/// is applied last:
///
/// ```no_run
/// use skiff_config::SettingsLoader;
///
/// # fn main() -> Result<(), skiff_config::SettingsError> {
/// let settings = SettingsLoader::new()
///     .with_optional_file("skiff.toml")?
///     .with_env_prefix("SKIFF")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsLoader {
    settings: HarnessSettings,
    env_prefix: Option<String>,
}

impl SettingsLoader {
    /// Create a loader with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML or JSON file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file is missing, unreadable, has an
    /// unsupported extension, or fails to parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SettingsError::file_not_found(path));
        }

        let content =
            fs::read_to_string(path).map_err(|e| SettingsError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let layer = Self::parse(&content, &format)
            .map_err(|e| match e {
                SettingsError::UnsupportedFormat(_) => {
                    SettingsError::UnsupportedFormat(path.display().to_string())
                }
                other => other,
            })?;
        self.settings.merge(layer);

        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, SettingsError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load settings from a string in the given format ("toml" or "json").
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use skiff_config::SettingsLoader;
    ///
    /// let settings = SettingsLoader::new()
    ///     .with_string("socket_timeout_ms = 3000", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(settings.socket_timeout_ms, Some(3000));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, SettingsError> {
        let layer = Self::parse(content, &format.to_lowercase())?;
        self.settings.merge(layer);
        Ok(self)
    }

    /// Read overrides from `PREFIX__FIELD` environment variables, e.g.
    /// `SKIFF__SOCKET_TIMEOUT_MS=3000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // Missing .env is fine.
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and return the settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::EnvParseError` if a variable under the prefix
    /// is unknown or holds an unparsable value.
    pub fn load(mut self) -> Result<HarnessSettings, SettingsError> {
        if let Some(prefix) = self.env_prefix.take() {
            let scope = format!("{prefix}__");
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&scope))
                .collect();
            self.apply_env_vars(&prefix, vars)?;
        }
        Ok(self.settings)
    }

    fn parse(content: &str, format: &str) -> Result<HarnessSettings, SettingsError> {
        match format {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(SettingsError::UnsupportedFormat(other.to_string())),
        }
    }

    fn apply_env_vars<I>(&mut self, prefix: &str, vars: I) -> Result<(), SettingsError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            self.apply_env_var(prefix, &key, &value)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, prefix: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        let field = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| SettingsError::env_parse_error(key, "invalid key format"))?;

        let settings = &mut self.settings;
        match field {
            "SOCKET_TIMEOUT_MS" => settings.socket_timeout_ms = Some(parse_u64(key, value)?),
            "CONTROLLED_SHUTDOWN" => settings.controlled_shutdown = Some(parse_bool(key, value)?),
            "CONTROLLED_SHUTDOWN_RETRY_BACKOFF_MS" => {
                settings.controlled_shutdown_retry_backoff_ms = Some(parse_u64(key, value)?);
            }
            "DELETE_TOPIC" => settings.delete_topic = Some(parse_bool(key, value)?),
            "LOG_CLEANER" => settings.log_cleaner = Some(parse_bool(key, value)?),
            "LOG_CLEANER_DEDUPE_BUFFER_SIZE" => {
                settings.log_cleaner_dedupe_buffer_size = Some(parse_u64(key, value)?);
            }
            "RACK" => settings.rack = non_empty(value),
            "COORDINATION_ENDPOINT" => settings.coordination_endpoint = non_empty(value),
            "LOG_LEVEL" => settings.log_level = non_empty(value),
            _ => return Err(SettingsError::env_parse_error(key, "unknown setting")),
        }
        Ok(())
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::env_parse_error(key, "expected integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::env_parse_error(key, "expected boolean")),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
