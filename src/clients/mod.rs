//! HTTP client types for booking API communication.
//!
//! This module provides the HTTP layer every service call goes through. It
//! handles request/response processing and the transparent refresh of an
//! expired access token.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP client for API communication
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, PATCH, DELETE)
//!
//! # Example
//!
//! ```rust,ignore
//! use court_booking::clients::{HttpMethod, HttpRequest};
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "courts/available")
//!     .query_param("startTime", "2024-06-01T10:00:00")
//!     .query_param("endTime", "2024-06-01T11:00:00")
//!     .build()
//!     .unwrap();
//!
//! let response = client.request(request).await?;
//! ```
//!
//! # 401 Handling
//!
//! - **First attempt gets 401**: refresh once, resend once with the new token
//! - **Resend gets 401**: returned as an error, no second refresh
//! - **Refresh fails**: the session is torn down, the observer is told the
//!   session expired and sent to login, and the original 401 is returned
//!
//! Login, registration, and the refresh call itself go through
//! [`HttpClient::send_unauthenticated`], which skips all of this.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, CLIENT_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
