//! Error handling for dataset generation

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, GlyphMillError>;

/// Main error type for GlyphMill operations
#[derive(Error, Debug)]
pub enum GlyphMillError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Image encoding or decoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Label file missing, unreadable or holding an unusable label
    #[error("Label file error: {0}")]
    LabelFile(String),

    /// Font directory is missing or holds no usable font
    #[error("No fonts found in {}", .0.display())]
    NoFonts(PathBuf),

    /// Font file could not be parsed
    #[error("Font error in {}: {message}", .path.display())]
    Font { path: PathBuf, message: String },

    /// Raster with an unusable shape was handed to the distortion engine
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl GlyphMillError {
    /// Create an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a label file error
    pub fn label_file(msg: impl Into<String>) -> Self {
        Self::LabelFile(msg.into())
    }

    /// Create an invalid raster error
    pub fn invalid_raster(msg: impl Into<String>) -> Self {
        Self::InvalidRaster(msg.into())
    }

    /// Whether this error was raised while validating inputs, before any output was written
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::LabelFile(_) | Self::NoFonts(_) | Self::Font { .. }
        )
    }
}

impl From<serde_json::Error> for GlyphMillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_classification() {
        assert!(GlyphMillError::invalid_config("bad").is_config_error());
        assert!(GlyphMillError::NoFonts(PathBuf::from("fonts")).is_config_error());
        assert!(!GlyphMillError::invalid_raster("empty").is_config_error());

        let io = GlyphMillError::from(io::Error::new(io::ErrorKind::Other, "disk"));
        assert!(!io.is_config_error());
    }

    #[test]
    fn test_context_message() {
        let err = GlyphMillError::with_context(
            "writing manifest",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "writing manifest: denied");
    }
}
