//! Error types for the drydock core
//!
//! This module defines all error types used throughout the crate.
//! Validation findings are not errors: rules return
//! [`ValidationMessage`](crate::validator::ValidationMessage) values instead.

use thiserror::Error;

/// Result type alias for drydock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ingestion and resolution
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (no usable plugins, unsupported design reference scheme)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required handle or argument was missing or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A named plugin, rule or source is not registered
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Resolution-time failures (inheritance cycle, dangling reference, malformed document)
    #[error("Processing error: {0}")]
    Processing(String),

    /// A plugin failed while ingesting
    #[error("Plugin error ({plugin}): {message}")]
    Plugin {
        /// Plugin name
        plugin: String,
        /// Error message
        message: String,
    },

    /// I/O errors while fetching design documents
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller cancelled the operation
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// The operation exceeded its time budget
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a processing error
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a plugin-specific error
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Whether this error is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether this error is a lookup error
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }

    /// Whether this error is a processing error
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
