//! HTTP-specific error types.
//!
//! - [`HttpResponseError`]: non-2xx responses from the API
//! - [`InvalidHttpRequestError`]: a request failed validation before sending
//! - [`HttpError`]: unified error type for all HTTP operations
//!
//! # Example
//!
//! ```rust,ignore
//! use court_booking::clients::HttpError;
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Response(e)) if e.is_unauthorized() => println!("Signed out"),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
//!     Err(e) => println!("Request failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::HttpResponse;

/// Error returned when a request receives a non-successful response.
///
/// `message` is the server-provided message when the body carries one, and
/// a generic status description otherwise.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Human-readable error message.
    pub message: String,
    /// The `message` field of the response body, if present.
    pub server_message: Option<String>,
}

impl HttpResponseError {
    /// Builds the error for a non-2xx response.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        let server_message = response.server_message().map(String::from);
        let message = server_message.clone().unwrap_or_else(|| {
            let reason = reqwest::StatusCode::from_u16(response.code)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("Unexpected status");
            format!("Request failed with status {}: {reason}", response.code)
        });

        Self {
            code: response.code,
            message,
            server_message,
        }
    }

    /// Returns `true` for a 401 response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.code == 401
    }
}

/// Error returned when a request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request body could not be serialized.
    #[error("Cannot serialize request body: {reason}")]
    InvalidBody {
        /// The serializer's error message.
        reason: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A successful response body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl HttpError {
    /// Returns the response error, if this is one.
    #[must_use]
    pub const fn as_response(&self) -> Option<&HttpResponseError> {
        match self {
            Self::Response(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the server-provided message, if the server sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        self.as_response()
            .and_then(|e| e.server_message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_response_error_prefers_server_message() {
        let response = HttpResponse::new(
            409,
            HashMap::new(),
            json!({"message": "Court already booked"}),
        );
        let error = HttpResponseError::from_response(&response);

        assert_eq!(error.code, 409);
        assert_eq!(error.to_string(), "Court already booked");
        assert_eq!(error.server_message.as_deref(), Some("Court already booked"));
    }

    #[test]
    fn test_response_error_falls_back_to_status() {
        let response = HttpResponse::new(503, HashMap::new(), json!(null));
        let error = HttpResponseError::from_response(&response);

        assert!(error.message.contains("503"));
        assert!(error.message.contains("Service Unavailable"));
        assert!(error.server_message.is_none());
    }

    #[test]
    fn test_is_unauthorized() {
        let response = HttpResponse::new(401, HashMap::new(), json!({}));
        assert!(HttpResponseError::from_response(&response).is_unauthorized());
    }

    #[test]
    fn test_http_error_server_message() {
        let error: HttpError = HttpResponseError {
            code: 400,
            message: "Bad".to_string(),
            server_message: Some("Bad".to_string()),
        }
        .into();
        assert_eq!(error.server_message(), Some("Bad"));

        let error: HttpError = InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        }
        .into();
        assert_eq!(error.server_message(), None);
    }

    #[test]
    fn test_invalid_request_error_messages() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use post without specifying data.");
    }
}
