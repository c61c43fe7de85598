//! Error types for client configuration.
//!
//! All configuration constructors return `Result<T, ConfigError>` so invalid
//! settings are rejected when the client is built, not on the first request.
//!
//! # Example
//!
//! ```rust
//! use court_booking::{ApiBaseUrl, ConfigError};
//!
//! let result = ApiBaseUrl::new("localhost:8080");
//! assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The API base URL is invalid.
    #[error("Invalid API base URL '{url}'. Expected an http or https URL (e.g., 'http://localhost:8080/api').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The storage key prefix cannot be empty.
    #[error("Storage prefix cannot be empty. Persisted session keys need a namespace.")]
    EmptyStoragePrefix,
}
