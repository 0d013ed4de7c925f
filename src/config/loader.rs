// src/config/loader.rs
//! Layered configuration loader: defaults, TOML files, environment overrides

use crate::config::{constants::paths, PsdConfig};
use crate::error::PsdError;
use std::path::{Path, PathBuf};

/// Configuration loader merging several TOML sources onto the defaults
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileNotFound(String),
    ParseError(String),
    ValidationError(Vec<String>),
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Configuration parse error: {}", msg),
            ConfigError::ValidationError(errors) => {
                write!(f, "Configuration validation errors: ")?;
                for error in errors {
                    write!(f, "\n  {}", error)?;
                }
                Ok(())
            }
            ConfigError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for PsdError {
    fn from(err: ConfigError) -> Self {
        PsdError::Configuration {
            component: "config_loader".to_string(),
            reason: err.to_string(),
        }
    }
}

impl ConfigLoader {
    /// Loader over the conventional local config files
    pub fn new() -> Self {
        Self::with_paths(vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ])
    }

    /// Create loader with custom paths (later paths take precedence)
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Replace the environment variable prefix
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Paths consulted by this loader
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load and validate the merged configuration
    ///
    /// Missing files among the loader's paths are skipped; an explicitly
    /// requested file should be checked with [`ConfigLoader::load_file`].
    pub fn load(&self) -> Result<PsdConfig, ConfigError> {
        let mut merged = toml::Value::try_from(PsdConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for config_path in &self.config_paths {
            match Self::load_config_file(config_path) {
                Ok(file_config) => {
                    tracing::debug!(path = %config_path.display(), "merging configuration file");
                    Self::merge_toml_values(&mut merged, file_config);
                }
                Err(ConfigError::FileNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        self.apply_environment_overrides(&mut merged);

        let config: PsdConfig = merged
            .try_into()
            .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

        config
            .validate_consistency()
            .map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Load one required file on top of the defaults
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<PsdConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        Self::with_paths(vec![path.to_path_buf()]).load()
    }

    /// Export configuration to a TOML file
    pub fn export_config<P: AsRef<Path>>(config: &PsdConfig, path: P) -> Result<(), ConfigError> {
        let toml_content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;

        Ok(config)
    }

    fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, value) in overlay_table {
                    if let Some(base_value) = base_table.get_mut(&key) {
                        Self::merge_toml_values(base_value, value);
                    } else {
                        base_table.insert(key, value);
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    /// `EEG_PSD_EXTRACTION_SAMPLE_RATE_HZ=512` sets `extraction.sample_rate_hz`
    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        for (key, value) in std::env::vars() {
            let Some(stripped) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            let lowered = stripped.to_lowercase();
            let Some((section, field)) = lowered.split_once('_') else {
                continue;
            };

            // Section names are single words, field names keep their underscores
            let Some(target) = Self::resolve_field(config, section, field) else {
                tracing::warn!(variable = %key, "ignoring unknown configuration override");
                continue;
            };
            *target = Self::parse_env_value(&value, target);
            tracing::debug!(variable = %key, "applied environment override");
        }
    }

    fn resolve_field<'a>(
        config: &'a mut toml::Value,
        section: &str,
        field: &str,
    ) -> Option<&'a mut toml::Value> {
        let section_table = config.get_mut(section)?;
        if section_table.get(field).is_some() {
            return section_table.get_mut(field);
        }

        // Nested tables: `windowing_overlap_percent` -> windowing.overlap_percent
        let (table, rest) = field.split_once('_')?;
        let nested = section_table.get_mut(table)?;
        if nested.is_table() {
            nested.get_mut(rest)
        } else {
            None
        }
    }

    fn parse_env_value(value: &str, current: &toml::Value) -> toml::Value {
        match current {
            toml::Value::Integer(_) => value
                .parse::<i64>()
                .map(toml::Value::Integer)
                .unwrap_or_else(|_| toml::Value::String(value.to_string())),
            toml::Value::Float(_) => value
                .parse::<f64>()
                .map(toml::Value::Float)
                .unwrap_or_else(|_| toml::Value::String(value.to_string())),
            toml::Value::Boolean(_) => value
                .parse::<bool>()
                .map(toml::Value::Boolean)
                .unwrap_or_else(|_| toml::Value::String(value.to_string())),
            _ => toml::Value::String(value.to_string()),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
