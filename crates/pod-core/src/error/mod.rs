//! Error types and result aliases for Pod operations.
//!
//! Provides a unified error type that covers every failure the registry shim
//! can observe, from cache reads to upstream lookups and event delivery.

use thiserror::Error;

/// Unified error type for all Pod operations
#[derive(Error, Debug)]
pub enum PodError {
    // Storage errors
    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{message}")]
    MalformedDocument { key: String, message: String },

    // Upstream registry errors
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Request errors
    #[error("Invalid package name '{name}': {reason}")]
    InvalidPackageName { name: String, reason: String },

    // Config errors
    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Failed to parse pod.toml: {message}")]
    TomlParse { message: String },

    // Event logging errors
    #[error("Failed to deliver event: {message}")]
    EventDelivery {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Transport errors
    #[error("Network error: {message}")]
    Network {
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
}

/// Result type alias for Pod operations
pub type PodResult<T> = Result<T, PodError>;

impl PodError {
    /// Create a storage error without an underlying cause
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error wrapping its cause
    pub fn storage_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an upstream error carrying the registry's status
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
            source: None,
        }
    }

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

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// HTTP status used when this error is turned into a response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            PodError::Upstream { status, .. } => *status,
            PodError::InvalidPackageName { .. } => 400,
            _ => 500,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            PodError::Network { .. } | PodError::Io { .. } | PodError::EventDelivery { .. } => true,
            PodError::Upstream { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PodError::ConfigValidation { .. } => {
                Some("Check pod.toml and the POD_* environment variables")
            },
            PodError::MalformedDocument { .. } => {
                Some("Republish the package to replace the corrupted cache document")
            },
            PodError::Network { .. } => Some("Check the registry URL and your network connection"),
            PodError::InvalidPackageName { .. } => {
                Some("Package names must be URL-encoded, non-empty UTF-8")
            },
            _ => None,
        }
    }
}
