//! Exchanging a refresh token for a new access token.
//!
//! This is the only network call the session layer makes on its own. It is
//! driven by [`HttpClient`] when a request gets 401 and is never retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use court_booking::auth::refresh::refresh_access_token;
//!
//! if let Some(refresh_token) = context.refresh_token() {
//!     let refreshed = refresh_access_token(&client, &refresh_token).await?;
//!     println!("Got a new access token");
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::auth::session::{is_usable_token, RefreshResponse};
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};

/// Path of the refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "auth/refresh-token";

/// Error returned when the access token cannot be refreshed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// No refresh token is available.
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The refresh request failed or returned an unusable body.
    ///
    /// `status` is 0 when no response was received.
    #[error("Token refresh failed with status {status}: {message}")]
    Failed {
        /// HTTP status code, or 0 for network failures.
        status: u16,
        /// Description of the failure.
        message: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Exchanges `refresh_token` for a new access token.
///
/// Sends `POST /auth/refresh-token` with `{"refreshToken": ...}`, bypassing
/// the 401 interceptor.
///
/// # Errors
///
/// - [`RefreshError::MissingRefreshToken`] if `refresh_token` is empty or
///   malformed
/// - [`RefreshError::Failed`] on a network failure, a non-2xx response, or a
///   response without a usable access token
pub async fn refresh_access_token(
    client: &HttpClient,
    refresh_token: &str,
) -> Result<RefreshResponse, RefreshError> {
    if !is_usable_token(refresh_token) {
        return Err(RefreshError::MissingRefreshToken);
    }

    let request = HttpRequest::builder(HttpMethod::Post, REFRESH_PATH)
        .json(&RefreshRequest { refresh_token })
        .build()
        .map_err(|e| RefreshError::Failed {
            status: 0,
            message: e.to_string(),
        })?;

    let response = client
        .send_unauthenticated(request)
        .await
        .map_err(|e| match e {
            HttpError::Response(e) => RefreshError::Failed {
                status: e.code,
                message: e.message,
            },
            other => RefreshError::Failed {
                status: 0,
                message: other.to_string(),
            },
        })?;

    let refreshed: RefreshResponse = response.json().map_err(|e| RefreshError::Failed {
        status: response.code,
        message: format!("Failed to parse token response: {e}"),
    })?;

    if !is_usable_token(&refreshed.access_token) {
        return Err(RefreshError::Failed {
            status: response.code,
            message: "Token response has an empty access token".to_string(),
        });
    }

    Ok(refreshed)
}
