//! Configuration file loading and management
//!
//! This module handles loading and parsing the gate configuration from
//! `$XDG_CONFIG_HOME/plugin-gate/config.toml`. If the configuration file
//! doesn't exist, a default configuration is created with documented comments.

use anyhow::{Context, Result};
use plugin_signature::{Environment, PluginSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `app_mode`.
pub const ENV_APP_MODE: &str = "PLUGIN_GATE_APP_MODE";

/// Environment variable overriding the unsigned allow-list (comma separated).
pub const ENV_ALLOW_UNSIGNED: &str = "PLUGIN_GATE_ALLOW_UNSIGNED";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Host run mode: "development" or "production"
    /// Default: "production"
    #[serde(default)]
    pub app_mode: Environment,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Signature enforcement configuration
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub level: String,
}

/// Signature enforcement configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginsConfig {
    /// Whether backend plugins must be signed
    /// Default: true
    #[serde(default = "default_require_signed")]
    pub require_signed: bool,
    /// Plugin IDs allowed to run unsigned
    #[serde(default)]
    pub allow_loading_unsigned_plugins: Vec<String>,
}

fn default_require_signed() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            require_signed: true,
            allow_loading_unsigned_plugins: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the specified path
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// The parsed configuration or an error if loading/parsing fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// See [`Config::load_or_create`].
    pub fn load_default() -> Result<(Self, Option<PathBuf>)> {
        let config_path = Self::default_config_path()?;
        let (config, created) = Self::load_or_create(&config_path)?;
        Ok((config, created.then_some(config_path)))
    }

    /// Load configuration, writing the documented default file first if
    /// `path` doesn't exist
    ///
    /// The flag is true when the file was created. Loading may happen before
    /// logging is set up, so reporting the creation is left to the caller.
    pub fn load_or_create(path: &Path) -> Result<(Self, bool)> {
        let created = !path.exists();
        if created {
            Self::create_default_file(path)?;
        }

        Ok((Self::load(path)?, created))
    }

    /// Get the default configuration file path
    ///
    /// Returns `$XDG_CONFIG_HOME/plugin-gate/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "raibid-labs", "plugin-gate")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Create a default configuration file with documented comments
    pub fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate the default configuration file content with comments
    fn default_config_content() -> String {
        r#"# plugin-gate configuration

# Host run mode: "development" or "production"
# In development mode unsigned backend plugins are allowed to run.
# Default: "production"
app_mode = "production"

[log]
# Log level: trace, debug, info, warn, error
# Default: "info"
level = "info"

[plugins]
# Require backend plugins to carry a valid signature
# Default: true
require_signed = true

# Plugin IDs allowed to run unsigned in production
# Default: []
allow_loading_unsigned_plugins = []
"#
        .to_string()
    }

    /// Override settings from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override settings from a variable lookup
    ///
    /// `PLUGIN_GATE_APP_MODE` replaces `app_mode`, and
    /// `PLUGIN_GATE_ALLOW_UNSIGNED` replaces the unsigned allow-list.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_APP_MODE) {
            self.app_mode = mode
                .parse::<Environment>()
                .with_context(|| format!("Invalid {}", ENV_APP_MODE))?;
        }

        if let Some(list) = lookup(ENV_ALLOW_UNSIGNED) {
            self.plugins.allow_loading_unsigned_plugins = PluginSettings::parse_allow_list(&list);
        }

        self.validate()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {}",
                self.log.level,
                valid_log_levels.join(", ")
            );
        }

        for id in &self.plugins.allow_loading_unsigned_plugins {
            if id.trim().is_empty() {
                anyhow::bail!("plugins.allow_loading_unsigned_plugins contains an empty plugin ID");
            }
        }

        Ok(())
    }

    /// Build the settings consulted by the signature validator
    pub fn settings(&self) -> PluginSettings {
        PluginSettings::new(self.app_mode)
            .with_allow_unsigned(self.plugins.allow_loading_unsigned_plugins.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_mode, Environment::Production);
        assert_eq!(config.log.level, "info");
        assert!(config.plugins.require_signed);
        assert!(config.plugins.allow_loading_unsigned_plugins.is_empty());
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
app_mode = "development"

[log]
level = "debug"

[plugins]
require_signed = false
allow_loading_unsigned_plugins = ["acme-plugin", "other-plugin"]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.app_mode, Environment::Development);
        assert_eq!(config.log.level, "debug");
        assert!(!config.plugins.require_signed);
        assert_eq!(
            config.plugins.allow_loading_unsigned_plugins,
            vec!["acme-plugin", "other-plugin"]
        );
    }

    #[test]
    fn test_load_minimal_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[plugins]\n").unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_rejects_unknown_mode() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"app_mode = \"staging\"\n").unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.log.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_allow_list_entry() {
        let mut config = Config::default();
        config.plugins.allow_loading_unsigned_plugins = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        Config::create_default_file(&path).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_create() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plugin-gate/config.toml");

        let (config, created) = Config::load_or_create(&path).unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(config, Config::default());

        fs::write(&path, "app_mode = \"development\"\n").unwrap();
        let (config, created) = Config::load_or_create(&path).unwrap();
        assert!(!created);
        assert_eq!(config.app_mode, Environment::Development);
    }

    #[test]
    fn test_app_mode_case_matches_env_override() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"app_mode = \"Development\"\n").unwrap();
        let from_file = Config::load(temp_file.path()).unwrap();

        let mut from_env = Config::default();
        from_env
            .apply_overrides(|key| (key == ENV_APP_MODE).then(|| "Development".to_string()))
            .unwrap();

        assert_eq!(from_file.app_mode, Environment::Development);
        assert_eq!(from_file.app_mode, from_env.app_mode);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_APP_MODE, "dev"),
            (ENV_ALLOW_UNSIGNED, "acme-plugin, other-plugin"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.app_mode, Environment::Development);
        assert_eq!(
            config.plugins.allow_loading_unsigned_plugins,
            vec!["acme-plugin", "other-plugin"]
        );
    }

    #[test]
    fn test_invalid_mode_override() {
        let mut config = Config::default();
        let result =
            config.apply_overrides(|key| (key == ENV_APP_MODE).then(|| "staging".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.plugins.allow_loading_unsigned_plugins = vec!["acme-plugin".to_string()];

        let settings = config.settings();
        assert_eq!(settings.environment, Environment::Production);
        assert!(settings.is_allowed_unsigned("acme-plugin"));
        assert!(!settings.is_allowed_unsigned("other-plugin"));
    }
}
