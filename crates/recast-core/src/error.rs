//! Error types for the recast core library
//!
//! This module defines the error handling system for recast, using thiserror
//! for ergonomic error definitions and anyhow as the escape hatch for foreign
//! errors raised inside caller-supplied policies.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Main error type for recast operations
#[derive(Error, Debug)]
pub enum Error {
    /// A key was read or cast that is absent from the record
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// A named cast policy is not registered on the container
    #[error("invalid cast policy '{name}': not registered (registered: {available:?})")]
    InvalidPolicy {
        name: String,
        available: Vec<String>,
    },

    /// A cast policy could not coerce the value at a key into its expected shape
    #[error("coercion failed at key '{key}': {message}")]
    Coercion { key: String, message: String },

    /// JSON encoding/decoding errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error with context, for policy implementations
    /// carrying errors from foreign libraries
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construct a [`Error::KeyNotFound`] for the given key
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Error::KeyNotFound { key: key.into() }
    }

    /// Construct a [`Error::Coercion`] for a policy that rejected its input
    pub fn coercion(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Coercion {
            key: key.into(),
            message: message.into(),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
