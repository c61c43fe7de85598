//! HTTP client for booking API communication.
//!
//! This module provides the [`HttpClient`] type for making requests to the
//! booking API with transparent access-token refresh.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::auth::observer::{Notice, Route, SessionObserver};
use crate::auth::refresh::refresh_access_token;
use crate::auth::session::bearer_header;
use crate::auth::SessionContext;
use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiBaseUrl, ClientConfig};

/// Client version from Cargo.toml.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the booking API.
///
/// The client handles:
/// - URL construction from the configured [`ApiBaseUrl`]
/// - Default headers including User-Agent and the bearer token
/// - One transparent refresh-and-retry when a request gets 401
/// - Tearing the session down when the refresh fails
///
/// # Refresh behavior
///
/// A 401 on a first attempt triggers exactly one refresh with the stored
/// refresh token; the request is then resent once with the new token. A 401
/// on the resend is returned as an error. Concurrent 401s share a single
/// refresh: whichever request gets there first refreshes, the rest resend
/// with the token it obtained.
///
/// If the refresh fails (or there is no refresh token), the session context is
/// cleared, the observer is told "Session expired" and asked to navigate to
/// the login route, and the original 401 is returned. The notice and the
/// navigation happen once per session, however many requests fail.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use court_booking::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(&config, context, Arc::new(TracingObserver))?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "bookings/user")
///     .build()
///     .unwrap();
///
/// let response = client.request(request).await?;
/// ```
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// API base URL (e.g., `http://localhost:8080/api`).
    base_url: ApiBaseUrl,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Shared session state.
    context: Arc<SessionContext>,
    /// Receives the session-expired notice and redirect.
    observer: Arc<dyn SessionObserver>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (for example when TLS initialization fails).
    pub fn new(
        config: &ClientConfig,
        context: Arc<SessionContext>,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}Court Booking Client v{CLIENT_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            default_headers,
            context,
            observer,
        })
    }

    /// Returns the API base URL for this client.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the default headers for this client.
    ///
    /// The `Authorization` header is not among them; it is read from the
    /// session context on every send.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the session context this client authenticates with.
    #[must_use]
    pub const fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Sends an authenticated request, refreshing the session once on 401.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received, including a 401 that could not be
    ///   recovered by refreshing (`Response`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let sent_with = self.context.authorization_header();
        let response = self.send(&request, sent_with.as_deref()).await?;

        if response.code != 401 || request.is_retry() {
            return Self::into_result(response);
        }

        tracing::debug!(
            "Request to {} got 401, attempting token refresh",
            request.path
        );
        let retry = request.into_retry();
        match self.recover(sent_with.as_deref()).await {
            Some(authorization) => {
                let response = self.send(&retry, Some(&authorization)).await?;
                Self::into_result(response)
            }
            None => Self::into_result(response),
        }
    }

    /// Sends a request without the bearer token and without 401 handling.
    ///
    /// Used for login, registration, and the refresh call itself.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for validation failures, network failures, and
    /// non-2xx responses.
    pub async fn send_unauthenticated(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, HttpError> {
        request.verify()?;
        let response = self.send(&request, None).await?;
        Self::into_result(response)
    }

    /// Sends an authenticated GET request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: &str) -> Result<HttpResponse, HttpError> {
        self.request(HttpRequest::builder(HttpMethod::Get, path).build()?)
            .await
    }

    /// Sends an authenticated POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse, HttpError> {
        self.request(HttpRequest::builder(HttpMethod::Post, path).json(body).build()?)
            .await
    }

    /// Sends an authenticated PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse, HttpError> {
        self.request(HttpRequest::builder(HttpMethod::Put, path).json(body).build()?)
            .await
    }

    /// Sends an authenticated PATCH request, with a JSON body when given.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = HttpRequest::builder(HttpMethod::Patch, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.request(builder.build()?).await
    }

    /// Sends an authenticated DELETE request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete(&self, path: &str) -> Result<HttpResponse, HttpError> {
        self.request(HttpRequest::builder(HttpMethod::Delete, path).build()?)
            .await
    }

    /// Obtains an `Authorization` value to resend a 401'd request with.
    ///
    /// `sent_with` is the header the failed attempt carried. Returns `None`
    /// when the session could not be recovered; the context has then been
    /// torn down.
    async fn recover(&self, sent_with: Option<&str>) -> Option<String> {
        let _gate = self.context.lock_refresh().await;

        match self.context.authorization_header() {
            // Another request already refreshed (or someone logged in).
            Some(current) if sent_with != Some(current.as_str()) => return Some(current),
            Some(_) => {}
            None => {
                self.expire();
                return None;
            }
        }

        let Some(refresh_token) = self.context.refresh_token() else {
            tracing::warn!("Session has no refresh token, cannot recover from 401");
            self.expire();
            return None;
        };

        match refresh_access_token(self, &refresh_token).await {
            Ok(refreshed) => match self.context.apply_refresh(&refresh_token, refreshed) {
                Ok(Some(access_token)) => {
                    tracing::debug!("Access token refreshed");
                    Some(bearer_header(&access_token))
                }
                Ok(None) => {
                    tracing::debug!("Session changed during refresh, discarding new token");
                    None
                }
                Err(e) => {
                    tracing::error!("Failed to persist refreshed session: {}", e);
                    self.expire();
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                self.expire();
                None
            }
        }
    }

    /// Tears the session down, telling the observer if one was active.
    fn expire(&self) {
        if self.context.teardown() {
            tracing::info!("Session expired");
            self.observer.notify(Notice::session_expired());
            self.observer.navigate(Route::Login);
        }
    }

    /// Sends a single attempt and parses the response.
    async fn send(
        &self,
        request: &HttpRequest,
        authorization: Option<&str>,
    ) -> Result<HttpResponse, HttpError> {
        let url = self.base_url.join(&request.path);

        let mut headers = self.default_headers.clone();
        if let Some(authorization) = authorization {
            headers.insert("Authorization".to_string(), authorization.to_string());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut req_builder = self
            .client
            .request(request.http_method.as_reqwest(), &url);

        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        tracing::debug!("Sending {} request to {}", request.http_method, request.path);
        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.unwrap_or_default();

        Ok(HttpResponse::new(
            code,
            res_headers,
            HttpResponse::parse_body(&body_text),
        ))
    }

    /// Turns a non-2xx response into an error.
    fn into_result(response: HttpResponse) -> Result<HttpResponse, HttpError> {
        if response.is_ok() {
            Ok(response)
        } else {
            Err(HttpError::Response(HttpResponseError::from_response(
                &response,
            )))
        }
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::observer::TracingObserver;
    use crate::auth::store::{CredentialStore, MemoryStorage};

    fn create_test_client(config: &ClientConfig) -> HttpClient {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()), config.storage_prefix());
        let context = Arc::new(SessionContext::new(store));
        HttpClient::new(config, context, Arc::new(TracingObserver)).unwrap()
    }

    #[test]
    fn test_client_construction_uses_config_base_url() {
        let config = ClientConfig::builder()
            .base_url(ApiBaseUrl::new("https://courts.example.com/api/").unwrap())
            .build()
            .unwrap();
        let client = create_test_client(&config);

        assert_eq!(client.base_url().as_ref(), "https://courts.example.com/api");
    }

    #[test]
    fn test_user_agent_header_format() {
        let client = create_test_client(&ClientConfig::default());

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("Court Booking Client v"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = ClientConfig::builder()
            .user_agent_prefix("KioskApp/2.0")
            .build()
            .unwrap();
        let client = create_test_client(&config);

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("KioskApp/2.0 | Court Booking Client v"));
    }

    #[test]
    fn test_default_headers_exclude_authorization() {
        let client = create_test_client(&ClientConfig::default());

        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
        assert!(!client.default_headers().contains_key("Authorization"));
    }

    #[test]
    fn test_into_result_maps_non_2xx() {
        let ok = HttpResponse::new(200, HashMap::new(), serde_json::json!({}));
        assert!(HttpClient::into_result(ok).is_ok());

        let err = HttpResponse::new(404, HashMap::new(), serde_json::json!({}));
        assert!(matches!(
            HttpClient::into_result(err),
            Err(HttpError::Response(HttpResponseError { code: 404, .. }))
        ));
    }
}
