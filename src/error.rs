//! Error types and handling for boxresize

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for boxresize operations
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Main error type for boxresize operations
#[derive(Debug, Error)]
pub enum ResizeError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Decode or encode failures reported by the codec
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Content sniffed as something other than JPEG, PNG or GIF
    #[error("Unsupported image format: {format} (file: {file:?})")]
    UnsupportedFormat {
        format: String,
        file: Option<PathBuf>,
    },

    /// Invalid resize parameters
    #[error("Invalid resize parameters: {message}")]
    InvalidParameters { message: String },

    /// Worker pool failures: a worker died or the result channel closed early
    #[error("Parallel processing error: {message}")]
    ParallelError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),

    /// Any error raised while processing one file
    #[error("Failed to process {}: {source}", file.display())]
    JobFailed {
        file: PathBuf,
        #[source]
        source: Box<ResizeError>,
    },
}

impl ResizeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S, file: Option<PathBuf>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
            file,
        }
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a new parallel processing error
    pub fn parallel<S: Into<String>>(message: S) -> Self {
        Self::ParallelError {
            message: message.into(),
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::UnsupportedFormat { file, .. } => file.as_deref(),
            Self::JobFailed { file, .. } => Some(file),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ResizeError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ResizeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}

/// Error context extension for adding file path information
pub trait ErrorContext<T> {
    /// Add file context to an error
    fn with_file_context<P: AsRef<Path>>(self, file: P) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ResizeError>,
{
    fn with_file_context<P: AsRef<Path>>(self, file: P) -> Result<T> {
        self.map_err(|e| {
            let error = e.into();
            match error {
                // Already carries a path
                ResizeError::JobFailed { .. } => error,
                ResizeError::UnsupportedFormat { format, file: None } => {
                    ResizeError::UnsupportedFormat {
                        format,
                        file: Some(file.as_ref().to_path_buf()),
                    }
                }
                other => ResizeError::JobFailed {
                    file: file.as_ref().to_path_buf(),
                    source: Box::new(other),
                },
            }
        })
    }
}
