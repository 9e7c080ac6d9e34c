//! Error types for export and import operations.

use thiserror::Error;

/// Errors that can occur during format operations.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Raster encoding or decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// ZIP archive error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Invalid format structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Version mismatch between supported and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Supported version string
        expected: String,
        /// Found version string
        found: String,
    },

    /// No format registered under this id or extension
    #[error("Unknown format '{0}'")]
    UnknownFormat(String),

    /// Operation not supported by this format
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn version_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::VersionMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
