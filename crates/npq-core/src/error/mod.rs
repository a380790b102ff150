//! Error types and result aliases for npq operations.
//!
//! Provides a unified error type that covers every failure a registry query
//! can produce, grouped into a small set of [`ErrorKind`]s callers can match on.

use thiserror::Error;

/// Unified error type for all npq operations
#[derive(Error, Debug)]
pub enum NpqError {
    // Argument errors
    #[error("Invalid package name '{name}': {reason}")]
    InvalidPackageName { name: String, reason: String },

    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    // Network errors
    #[error("Registry returned status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Validation errors
    #[error("Response does not match {shape} at '{path}': {message}")]
    Validation {
        shape: String,
        path: String,
        message: String,
    },

    // Storage errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    // Config errors
    #[error("Failed to parse npq.toml: {message}")]
    TomlParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },
}

/// Result type alias for npq operations
pub type NpqResult<T> = Result<T, NpqError>;

/// Coarse classification of an [`NpqError`].
///
/// `InvalidArgument` failures happen before any I/O, `Network` failures carry
/// transport or status detail and `Validation` failures carry the offending
/// field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Network,
    Validation,
    Storage,
    Config,
}

impl NpqError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage error from any error type
    pub fn storage<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            NpqError::InvalidPackageName { .. } | NpqError::InvalidArgument { .. } => {
                ErrorKind::InvalidArgument
            },
            NpqError::HttpStatus { .. } | NpqError::Network { .. } => ErrorKind::Network,
            NpqError::Validation { .. } => ErrorKind::Validation,
            NpqError::Storage { .. } | NpqError::Io { .. } => ErrorKind::Storage,
            NpqError::TomlParse { .. } | NpqError::ConfigValidation { .. } => ErrorKind::Config,
        }
    }

    /// HTTP status code, when the registry answered with a non-success status
    pub fn status(&self) -> Option<u16> {
        match self {
            NpqError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            NpqError::InvalidPackageName { .. } => {
                Some("Package names are lowercase, URL-safe and may be scoped as @scope/name")
            },
            NpqError::HttpStatus { status: 404, .. } => {
                Some("Check the package name and version spelling")
            },
            NpqError::Network { .. } => Some("Check your internet connection and try again"),
            NpqError::Validation { .. } => {
                Some("Clear the cache with 'npq cache clear' if the stored entry is outdated")
            },
            NpqError::ConfigValidation { .. } | NpqError::TomlParse { .. } => {
                Some("Fix the value in npq.toml or the matching NPQ_* environment variable")
            },
            _ => None,
        }
    }
}
