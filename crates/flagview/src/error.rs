//! Error types for flagview.
//!
//! Loading is all-or-nothing: a missing data directory or a single malformed
//! document fails the whole load. An unknown flag name is an ordinary outcome
//! for the web views and only becomes [`Error::FlagNotFound`] on the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flagview operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Data Errors ===
    /// The configured data directory does not exist.
    #[error("feature flag directory not found: {path}")]
    DataDirMissing {
        /// The directory that was expected to exist.
        path: PathBuf,
    },

    /// The data directory exists but could not be listed.
    #[error("failed to read feature flag directory {path}: {source}")]
    DataDirRead {
        /// The directory being listed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A flag document could not be read from disk.
    #[error("failed to read flag document {path}: {source}")]
    DocumentRead {
        /// Path of the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A flag document is not a valid array of flag records.
    #[error("malformed flag document {path}: {source}")]
    DocumentParse {
        /// Path of the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// No flag with the requested name exists after merging.
    #[error("feature flag not found: {name}")]
    FlagNotFound {
        /// The name that was looked up.
        name: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Server Errors ===
    /// The HTTP server failed to start or stopped unexpectedly.
    #[error("server error: {message}")]
    Server {
        /// Description of what went wrong.
        message: String,
    },
}

/// A specialized Result type for flagview operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a flag-not-found error.
    #[must_use]
    pub fn flag_not_found(name: impl Into<String>) -> Self {
        Self::FlagNotFound { name: name.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Check if this error means the requested flag does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FlagNotFound { .. })
    }

    /// Check if this error stems from configuration rather than data.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::DataDirMissing { .. }
                | Self::DataDirRead { .. }
                | Self::ConfigLoad(_)
                | Self::ConfigValidation { .. }
        )
    }
}
