//! Rendering configuration loaded from an optional TOML file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Knobs that affect how the summary document is laid out
///
/// Every field has a default so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font family applied to every registered style
    pub font_family: String,

    /// Left indent added per list nesting level, in twips
    pub list_indent: i32,

    /// Usable page width shared equally between table columns, in twips
    pub content_width: usize,

    /// Widest an embedded image may be, in pixels at 96 DPI
    pub max_image_width_px: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            list_indent: 720,
            // A4 with 2.54cm margins
            content_width: 9026,
            max_image_width_px: 624,
        }
    }
}

impl RenderConfig {
    /// Load configuration from a TOML file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RenderConfig)` - Successfully loaded configuration, defaults filled in
    /// * `Err(ConfigError)` - Error reading or parsing the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = toml::from_str(content)?;
        Ok(config)
    }
}

/// Errors that can occur when loading the rendering configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error when reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
