//! Configuration management for boxresize

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ResizeError, Result};

/// Worker count used when neither the config file nor the CLI sets one
pub const DEFAULT_WORKERS: usize = 5;

/// Marker appended to output base names; files carrying it are never reprocessed
pub const DEFAULT_MARKER: &str = "_resized";

/// Scaling factor used when none is given
pub const DEFAULT_FACTOR: f64 = 0.5;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Batch processing settings
    pub processing: ProcessingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Batch processing configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Number of worker threads in the pool
    pub workers: usize,

    /// Substring marking files produced by a previous run
    pub marker: String,

    /// Recognized input extensions, lowercase, without the leading dot
    pub extensions: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            marker: DEFAULT_MARKER.to_string(),
            extensions: ["jpg", "jpeg", "png", "gif"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

impl ProcessingConfig {
    /// Check whether a lowercase extension is one of the recognized ones
    pub fn recognizes(&self, extension: &str) -> bool {
        self.extensions.iter().any(|ext| ext == extension)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Downscaling ratio applied to both width and height.
///
/// Always strictly between 0.0 and 1.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Validate and wrap a raw factor
    pub fn new(factor: f64) -> Result<Self> {
        if factor > 0.0 && factor < 1.0 {
            Ok(Self(factor))
        } else {
            Err(ResizeError::invalid_parameters(format!(
                "scaling factor must lie strictly between 0.0 and 1.0, got {}",
                factor
            )))
        }
    }

    /// Raw factor value
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(DEFAULT_FACTOR)
    }
}

impl FromStr for ScaleFactor {
    type Err = ResizeError;

    fn from_str(s: &str) -> Result<Self> {
        let factor = s.trim().parse::<f64>().map_err(|_| {
            ResizeError::invalid_parameters(format!("'{}' is not a number", s))
        })?;
        Self::new(factor)
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ResizeError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let parsed = match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(ResizeError::from),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ResizeError::from),
            _ => {
                return Err(ResizeError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        parsed.map_err(|e| {
            ResizeError::config(format!("Invalid config file {:?}: {}", path.as_ref(), e))
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let processing = &self.processing;

        if processing.workers == 0 {
            return Err(ResizeError::config("Worker count must be greater than 0"));
        }

        if processing.marker.is_empty() {
            return Err(ResizeError::config("Output marker must not be empty"));
        }

        if processing.extensions.is_empty() {
            return Err(ResizeError::config(
                "At least one input extension must be recognized",
            ));
        }

        for ext in &processing.extensions {
            if ext.is_empty() || ext.starts_with('.') || *ext != ext.to_lowercase() {
                return Err(ResizeError::config(format!(
                    "Extension '{}' must be lowercase and written without a leading dot",
                    ext
                )));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ResizeError::config("Log level must not be empty"));
        }

        Ok(())
    }
}
