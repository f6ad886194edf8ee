//! Unified error handling for the folio-i18n crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`FolioErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Runtime paths (lookup, refinement, persistence) log and degrade instead of
//! returning these. They surface at startup: loading resources, reading
//! configuration, building the geolocation client.

use std::io;
use thiserror::Error;

pub use crate::i18n::refine::GeoError;
pub use crate::i18n::UnknownLocale;
pub use crate::resources::{ResourceError, UnknownNamespace};
pub use crate::storage::StorageError;

/// Common trait for all folio-i18n error types
pub trait FolioErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Geolocation and other network errors
    Network,
    /// Translation resource errors
    Resources,
    /// Preference storage errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Invalid user input (unknown locale or namespace)
    Input,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short description for the category
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Resources => "translation resource error",
            Self::Storage => "storage error",
            Self::Config => "configuration error",
            Self::Input => "invalid input",
            Self::Other => "other error",
        }
    }
}

impl FolioErrorTrait for GeoError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Provider(_) => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Decode(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl FolioErrorTrait for StorageError {
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Storage
    }
}

/// Unified error type for the folio-i18n crate
#[derive(Error, Debug)]
pub enum Error {
    /// Translation resources could not be loaded
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Preference storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Geolocation lookup failed
    #[error("Geolocation error: {0}")]
    Geo(#[from] GeoError),

    /// Unsupported locale tag
    #[error(transparent)]
    Locale(#[from] UnknownLocale),

    /// Unknown namespace name
    #[error(transparent)]
    Namespace(#[from] UnknownNamespace),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FolioErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Geo(e) => e.is_recoverable(),
            Self::Storage(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Resource(_)
            | Self::Locale(_)
            | Self::Namespace(_)
            | Self::Config(_)
            | Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Geo(_) => ErrorCategory::Network,
            Self::Resource(_) => ErrorCategory::Resources,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Locale(_) | Self::Namespace(_) => ErrorCategory::Input,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
