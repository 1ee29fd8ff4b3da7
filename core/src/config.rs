/// Configuration management for the sequence editor.
/// Handles loading, parsing and validation of .sequencer/config.toml
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{ConfigError, ConfigResult};
use crate::geometry::{MeasuredOrDefault, Size, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};
use crate::graph::DEFAULT_EDGE_STYLE;
use crate::group::{DEFAULT_GROUP_LABEL_PREFIX, DEFAULT_GROUP_PADDING};
use crate::zone::DEFAULT_ZONE_PADDING;

pub const DEFAULT_CONFIG_PATH: &str = ".sequencer/config.toml";
pub const ENV_STORAGE_PATH: &str = "SEQUENCER_STORAGE_PATH";
pub const ENV_LOG_LEVEL: &str = "SEQUENCER_LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Configuration file version
    #[serde(default = "default_version")]
    pub version: String,

    /// Canvas geometry and labelling constants
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Where documents are stored
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            canvas: CanvasConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Width used for nodes the renderer has not measured
    #[serde(default = "default_node_width")]
    pub default_node_width: f64,

    /// Height used for nodes the renderer has not measured
    #[serde(default = "default_node_height")]
    pub default_node_height: f64,

    #[serde(default = "default_group_padding")]
    pub group_padding: f64,

    #[serde(default = "default_zone_padding")]
    pub zone_padding: f64,

    /// New groups are labelled "<prefix> N"
    #[serde(default = "default_group_label_prefix")]
    pub group_label_prefix: String,

    #[serde(default = "default_edge_style")]
    pub default_edge_style: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_node_width: default_node_width(),
            default_node_height: default_node_height(),
            group_padding: default_group_padding(),
            zone_padding: default_zone_padding(),
            group_label_prefix: default_group_label_prefix(),
            default_edge_style: default_edge_style(),
        }
    }
}

impl CanvasConfig {
    /// Size provider using this config's fallback node size
    pub fn size_provider(&self) -> MeasuredOrDefault {
        MeasuredOrDefault::new(Size::new(self.default_node_width, self.default_node_height))
    }
}

fn default_node_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

fn default_node_height() -> f64 {
    DEFAULT_NODE_HEIGHT
}

fn default_group_padding() -> f64 {
    DEFAULT_GROUP_PADDING
}

fn default_zone_padding() -> f64 {
    DEFAULT_ZONE_PADDING
}

fn default_group_label_prefix() -> String {
    DEFAULT_GROUP_LABEL_PREFIX.to_string()
}

fn default_edge_style() -> String {
    DEFAULT_EDGE_STYLE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the JSON document repository
    #[serde(default = "default_storage_path")]
    pub base_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    ".sequencer/documents".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Loads, validates and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: SequencerConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load configuration from `config_path`, or from `.sequencer/config.toml`.
    ///
    /// A missing file yields the defaults.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = if path.exists() {
            info!("Loading config from {:?}", path);
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            warn!("Config file not found at {:?}, using defaults", path);
            SequencerConfig::default()
        };

        debug!("Configuration loaded successfully");
        Ok(ConfigManager {
            config,
            config_path: path,
        })
    }

    pub fn with_config(config: SequencerConfig, config_path: impl Into<PathBuf>) -> Self {
        ConfigManager {
            config,
            config_path: config_path.into(),
        }
    }

    /// Get configuration reference
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Get mutable configuration reference
    pub fn config_mut(&mut self) -> &mut SequencerConfig {
        &mut self.config
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Save configuration to file
    pub fn save(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(&self.config)?;
        std::fs::write(&self.config_path, content)?;

        info!("Configuration saved to {:?}", self.config_path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let canvas = &self.config.canvas;

        let size = Size::new(canvas.default_node_width, canvas.default_node_height);
        if !size.is_valid() || size.width == 0.0 || size.height == 0.0 {
            return Err(ConfigError::Invalid(
                "Default node size must be positive and finite".to_string(),
            ));
        }

        for (name, padding) in [
            ("group_padding", canvas.group_padding),
            ("zone_padding", canvas.zone_padding),
        ] {
            if !padding.is_finite() || padding < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }

        if canvas.group_label_prefix.trim().is_empty() {
            warn!("Empty group label prefix - groups will be labelled by number only");
        }

        if self.config.storage.base_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Storage base path must not be empty".to_string(),
            ));
        }

        let level = self.config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Unknown log level: {}",
                self.config.logging.level
            )));
        }

        debug!("Configuration validation passed");
        Ok(())
    }

    /// Load overrides from environment variables
    pub fn load_from_env(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup, e.g. the process environment
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_STORAGE_PATH) {
            debug!("Storage path overridden from {}", ENV_STORAGE_PATH);
            self.config.storage.base_path = path;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            debug!("Log level overridden from {}", ENV_LOG_LEVEL);
            self.config.logging.level = level;
        }
    }
}
