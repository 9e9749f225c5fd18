use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use toml::Value;
use log::LevelFilter;
use crate::logging::{self, LogConfig, LogDestination, LogFormat};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "MUNIN_PLUGIN_CONFIG";
/// Console log level override
pub const LOG_LEVEL_ENV: &str = "MUNIN_PLUGIN_LOG_LEVEL";
/// Log format override (`text` or `json`)
pub const LOG_FORMAT_ENV: &str = "MUNIN_PLUGIN_LOG_FORMAT";
/// Log file override
pub const LOG_FILE_ENV: &str = "MUNIN_PLUGIN_LOG_FILE";
/// File log level override
pub const LOG_FILE_LEVEL_ENV: &str = "MUNIN_PLUGIN_LOG_FILE_LEVEL";
/// Set by `munin-run --debug`
pub const MUNIN_DEBUG_ENV: &str = "MUNIN_DEBUG";

/// Table holding per-plugin sections, e.g. `[plugins.if]`
pub const PLUGINS_SECTION: &str = "plugins";

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Framework configuration for a plugin process
///
/// Values are looked up in the selected section (the plugin's name) first,
/// either as a top-level `[name]` table or nested as `[plugins.name]`, then
/// the requested section, then `base`.
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using the discovery hierarchy
    ///
    /// A missing file is not an error; a file that exists but cannot be
    /// parsed is.
    pub fn load() -> Result<Self> {
        for path in discover_config_files() {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    /// Path of the file this configuration was read from
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> plugins.selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            let nested = format!("{}.{}", PLUGINS_SECTION, selected);
            for name in [selected, &nested] {
                if let Some(value) = self.config.get(name).and_then(|s| s.get(key)) {
                    return Some(value);
                }
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select the plugin-specific section
    pub fn select_section(&mut self, section: String) {
        self.selected_section = Some(section);
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Build the logging configuration from the process environment and this file
    pub fn log_config(&self, plugin: &str) -> Result<LogConfig> {
        self.log_config_with(plugin, |name| env::var(name).ok())
    }

    /// Build the logging configuration, reading overrides through `lookup`
    ///
    /// Environment overrides win over file values, which win over defaults.
    pub fn log_config_with<F>(&self, plugin: &str, lookup: F) -> Result<LogConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty variables count as unset
        let env_value = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let debug_requested = env_value(MUNIN_DEBUG_ENV)
            .map(|value| value != "0")
            .unwrap_or(false);

        let console_level = match env_value(LOG_LEVEL_ENV) {
            Some(level) => logging::parse_log_level(&level)
                .with_context(|| format!("Invalid {}", LOG_LEVEL_ENV))?,
            None if debug_requested => LevelFilter::Debug,
            None => self.get_log_level("base", "console-level")?
                .unwrap_or(LevelFilter::Warn),
        };

        let format = match env_value(LOG_FORMAT_ENV).or_else(|| self.get_value("base", "log-format").cloned()) {
            Some(format) => format.parse::<LogFormat>().map_err(|e| anyhow::anyhow!(e))?,
            None => LogFormat::Text,
        };

        let log_file = env_value(LOG_FILE_ENV)
            .map(PathBuf::from)
            .or_else(|| self.get_path("base", "log-file"));

        let file_level = match env_value(LOG_FILE_LEVEL_ENV) {
            Some(level) => Some(logging::parse_log_level(&level)
                .with_context(|| format!("Invalid {}", LOG_FILE_LEVEL_ENV))?),
            None => self.get_log_level("base", "file-log-level")?,
        };

        let (destination, file_level) = match log_file {
            Some(path) => (LogDestination::Both(path), Some(file_level.unwrap_or(console_level))),
            None => (LogDestination::Console, None),
        };

        Ok(LogConfig {
            plugin: plugin.to_string(),
            console_level,
            file_level,
            format,
            destination,
        })
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $MUNIN_PLUGIN_CONFIG
    if let Ok(env_path) = env::var(CONFIG_ENV) {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("munin-plugin").join("config.toml"));
    }

    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) if subtable.values().all(|v| !v.is_table()) => {
                config.entry(section_name)
                    .or_default()
                    .extend(subtable.iter().map(|(subkey, subvalue)| (subkey.clone(), toml_value_to_string(subvalue))));
            }
            Value::Table(subtable) => flatten_toml_table(subtable, section_name, config),
            // Top-level keys belong to the base section
            _ => {
                config.entry("base".to_string())
                    .or_default()
                    .insert(section_name, toml_value_to_string(value));
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn sample_config() -> Configuration {
        parse_toml_config(r#"
[base]
console-level = "info"
log-format = "text"

[if]
console-level = "debug"
log-file = "/var/log/munin/if.log"
"#).unwrap()
    }

    #[test]
    fn test_toml_value_to_string_conversion() {
        assert_eq!(toml_value_to_string(&Value::String("test".to_string())), "test");
        assert_eq!(toml_value_to_string(&Value::Integer(42)), "42");
        assert_eq!(toml_value_to_string(&Value::Boolean(false)), "false");
    }

    #[test]
    fn test_parse_toml_config() {
        let config = parse_toml_config(r#"
log-format = "json"

[base]
console-level = "warn"

[plugins.if]
file-log-level = "trace"
"#).unwrap();

        assert_eq!(config["base"]["log-format"], "json");
        assert_eq!(config["base"]["console-level"], "warn");
        assert_eq!(config["plugins.if"]["file-log-level"], "trace");
    }

    #[test]
    fn test_section_fallback() {
        let mut manager = ConfigManager::from_config(sample_config());
        assert_eq!(manager.get_value("base", "console-level").unwrap(), "info");

        manager.select_section("if".to_string());
        assert_eq!(manager.get_value("base", "console-level").unwrap(), "debug");
        assert_eq!(manager.get_value("base", "log-format").unwrap(), "text");
        assert!(manager.get_value("base", "missing").is_none());
    }

    #[test]
    fn test_type_conversion() {
        let config = parse_toml_config(r#"
[base]
console-level = "Error"
bad-level = "loud"
"#).unwrap();
        let manager = ConfigManager::from_config(config);

        assert_eq!(manager.get_log_level("base", "console-level").unwrap(), Some(LevelFilter::Error));
        assert!(manager.get_log_level("base", "bad-level").is_err());
        assert!(manager.get_log_level("base", "missing").unwrap().is_none());
        assert!(manager.get_path("base", "missing").is_none());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[base]\nlog-format = \"json\"\n").unwrap();

        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        assert_eq!(manager.get_value("base", "log-format").unwrap(), "json");
        assert_eq!(manager.config_file_path(), Some(temp_file.path()));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[base\n").unwrap();
        assert!(ConfigManager::load_from_file(temp_file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_default_log_config() {
        let manager = ConfigManager::from_config(Configuration::new());
        let config = manager.log_config_with("load", no_env).unwrap();
        assert_eq!(config.plugin, "load");
        assert_eq!(config.console_level, LevelFilter::Warn);
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.destination, LogDestination::Console);
        assert!(config.file_level.is_none());
    }

    #[test]
    fn test_log_config_from_selected_section() {
        let mut manager = ConfigManager::from_config(sample_config());
        manager.select_section("if".to_string());

        let config = manager.log_config_with("if", no_env).unwrap();
        assert_eq!(config.console_level, LevelFilter::Debug);
        assert_eq!(config.destination, LogDestination::Both(PathBuf::from("/var/log/munin/if.log")));
        assert_eq!(config.file_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn test_log_config_from_nested_plugin_section() {
        let config = parse_toml_config(r#"
[base]
console-level = "info"

[plugins.if]
console-level = "trace"
log-format = "json"
"#).unwrap();
        let mut manager = ConfigManager::from_config(config);
        manager.select_section("if".to_string());

        let config = manager.log_config_with("if", no_env).unwrap();
        assert_eq!(config.console_level, LevelFilter::Trace);
        assert_eq!(config.format, LogFormat::Json);

        manager.select_section("load".to_string());
        let config = manager.log_config_with("load", no_env).unwrap();
        assert_eq!(config.console_level, LevelFilter::Info);
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_top_level_section_wins_over_nested() {
        let config = parse_toml_config(r#"
[if]
console-level = "error"

[plugins.if]
console-level = "trace"
"#).unwrap();
        let mut manager = ConfigManager::from_config(config);
        manager.select_section("if".to_string());
        assert_eq!(manager.get_value("base", "console-level").unwrap(), "error");
    }

    #[test]
    fn test_environment_overrides_file() {
        let manager = ConfigManager::from_config(sample_config());
        let config = manager.log_config_with("load", |name| match name {
            LOG_LEVEL_ENV => Some("error".to_string()),
            LOG_FORMAT_ENV => Some("json".to_string()),
            _ => None,
        }).unwrap();
        assert_eq!(config.console_level, LevelFilter::Error);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_munin_debug_raises_console_level() {
        let manager = ConfigManager::from_config(Configuration::new());
        let config = manager.log_config_with("load", |name| {
            (name == MUNIN_DEBUG_ENV).then(|| "1".to_string())
        }).unwrap();
        assert_eq!(config.console_level, LevelFilter::Debug);

        let config = manager.log_config_with("load", |name| {
            (name == MUNIN_DEBUG_ENV).then(|| "0".to_string())
        }).unwrap();
        assert_eq!(config.console_level, LevelFilter::Warn);
    }

    #[test]
    fn test_invalid_environment_level() {
        let manager = ConfigManager::from_config(Configuration::new());
        let result = manager.log_config_with("load", |name| {
            (name == LOG_LEVEL_ENV).then(|| "chatty".to_string())
        });
        assert!(result.is_err());
    }
}
