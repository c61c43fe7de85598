//! HTTP response types for the booking API.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::clients::errors::HttpError;

/// An HTTP response from the booking API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lower-cased; a header may have multiple values.
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    ///
    /// An empty body is `Null`. A body that is not JSON is wrapped as
    /// `{"raw_body": "<text>"}`.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Parses a raw body into the JSON representation used by `body`.
    pub(crate) fn parse_body(text: &str) -> serde_json::Value {
        if text.trim().is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw_body": text }))
    }

    /// Returns `true` for a 2xx status code.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of the header `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the server-provided `message` field, if present.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.trim().is_empty())
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_value(self.body.clone()).map_err(HttpError::Decode)
    }
}
