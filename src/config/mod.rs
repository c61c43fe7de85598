//! Configuration types for the booking client.
//!
//! - [`ClientConfig`]: settings shared by the HTTP client and session storage
//! - [`ClientConfigBuilder`]: builder for [`ClientConfig`]
//! - [`ApiBaseUrl`]: a validated API base URL
//!
//! # Example
//!
//! ```rust
//! use court_booking::{ApiBaseUrl, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("https://courts.example.com/api").unwrap())
//!     .storage_prefix("club_")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.storage_prefix(), "club_");
//! ```

mod newtypes;

pub use newtypes::ApiBaseUrl;

use std::time::Duration;

use crate::error::ConfigError;

/// Default prefix for persisted session keys.
pub const DEFAULT_STORAGE_PREFIX: &str = "tennis_";

/// Configuration for the booking client.
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`. It is instance-based: each
/// application root builds one and hands it to [`crate::BookingApp`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: ApiBaseUrl,
    storage_prefix: String,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the prefix used for persisted session keys.
    #[must_use]
    pub fn storage_prefix(&self) -> &str {
        &self.storage_prefix
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ApiBaseUrl::default(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            user_agent_prefix: None,
            timeout: None,
        }
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// # Defaults
///
/// - `base_url`: `http://localhost:8080/api`
/// - `storage_prefix`: `"tennis_"`
/// - `user_agent_prefix`: `None`
/// - `timeout`: `None` (reqwest default)
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<ApiBaseUrl>,
    storage_prefix: Option<String>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: ApiBaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the prefix for persisted session keys.
    #[must_use]
    pub fn storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = Some(prefix.into());
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyStoragePrefix`] if the storage prefix was
    /// set to an empty or whitespace-only string.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let storage_prefix = match self.storage_prefix {
            Some(prefix) if prefix.trim().is_empty() => {
                return Err(ConfigError::EmptyStoragePrefix)
            }
            Some(prefix) => prefix,
            None => DEFAULT_STORAGE_PREFIX.to_string(),
        };

        Ok(ClientConfig {
            base_url: self.base_url.unwrap_or_default(),
            storage_prefix,
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder().build().unwrap();

        assert_eq!(config.base_url().as_ref(), "http://localhost:8080/api");
        assert_eq!(config.storage_prefix(), "tennis_");
        assert!(config.user_agent_prefix().is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_builder_rejects_empty_storage_prefix() {
        let result = ClientConfig::builder().storage_prefix("  ").build();
        assert!(matches!(result, Err(ConfigError::EmptyStoragePrefix)));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = ClientConfig::builder()
            .base_url(ApiBaseUrl::new("https://courts.example.com/api").unwrap())
            .storage_prefix("club_")
            .user_agent_prefix("CourtKiosk/2.1")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.base_url().host_name(), "courts.example.com");
        assert_eq!(config.storage_prefix(), "club_");
        assert_eq!(config.user_agent_prefix(), Some("CourtKiosk/2.1"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_default_config_equals_empty_builder() {
        let built = ClientConfig::builder().build().unwrap();
        let default = ClientConfig::default();
        assert_eq!(built.base_url(), default.base_url());
        assert_eq!(built.storage_prefix(), default.storage_prefix());
    }
}
