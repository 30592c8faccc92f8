//! # Configuration
//!
//! Optional `canvas.toml` holding defaults for the command line.
//!
//! ```toml
//! [output]
//! format = "json"   # or "binary" (clipboard bytes)
//! pretty = true
//!
//! [input]
//! max_size = 16777216
//! ```
//!
//! A missing file yields the defaults; a malformed one is an error.

use canvas_core::CanvasError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default name of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "canvas.toml";

/// Default limit on canvas files read from disk (16 MB).
pub const DEFAULT_MAX_INPUT_SIZE: u64 = 16 * 1024 * 1024;

/// On-disk encoding of written canvases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `SerializableNode` record as JSON.
    #[default]
    Json,
    /// Clipboard format: header followed by the postcard payload.
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Largest canvas file accepted, in bytes.
    pub max_size: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub input: InputConfig,
}

impl Config {
    /// Load the configuration at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, CanvasError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            CanvasError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::parse(&text).map_err(|e| match e {
            CanvasError::DeserializationError(message) => CanvasError::DeserializationError(
                format!("Invalid config '{}': {}", path.display(), message),
            ),
            other => other,
        })
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self, CanvasError> {
        toml::from_str(text).map_err(|e| CanvasError::DeserializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let config = Config::parse("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
        assert_eq!(config.input.max_size, DEFAULT_MAX_INPUT_SIZE);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::parse("[output]\nformat = \"binary\"\n").expect("parse");
        assert_eq!(config.output.format, OutputFormat::Binary);
        assert!(config.output.pretty);
        assert_eq!(config.input, InputConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::parse("[output]\ncolour = true\n");
        assert!(matches!(result, Err(CanvasError::DeserializationError(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("definitely/not/here/canvas.toml")).expect("load");
        assert_eq!(config, Config::default());
    }
}
