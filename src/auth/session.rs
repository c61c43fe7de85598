//! Session types for authenticated API calls.
//!
//! This module provides the [`Session`] type and the wire types for the
//! login and refresh responses it is built from.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;
use std::fmt;

use crate::auth::UserProfile;

/// The authenticated identity and credentials of one session context.
///
/// A session is created from a successful login and replaced wholesale when
/// the access token is refreshed. Its `Debug` output masks both tokens.
///
/// # Example
///
/// ```rust
/// use court_booking::{Session, UserProfile};
///
/// let user: UserProfile = serde_json::from_str(r#"{"id":"u1","firstName":"A"}"#).unwrap();
/// let session = Session::new("secret-token".to_string(), None, user);
///
/// assert_eq!(session.bearer(), "Bearer secret-token");
/// assert!(!format!("{session:?}").contains("secret-token"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Short-lived credential sent with every authenticated request.
    pub access_token: String,

    /// Longer-lived credential used to obtain a new access token.
    pub refresh_token: Option<String>,

    /// Snapshot of the signed-in user.
    pub user: UserProfile,
}

impl Session {
    /// Creates a new session.
    #[must_use]
    pub const fn new(access_token: String, refresh_token: Option<String>, user: UserProfile) -> Self {
        Self {
            access_token,
            refresh_token,
            user,
        }
    }

    /// Builds a session from a login response.
    ///
    /// A refresh token that could not be sent back in a header (empty or
    /// containing whitespace) is dropped.
    #[must_use]
    pub fn from_login_response(response: LoginResponse) -> Self {
        Self::new(
            response.access_token,
            response.refresh_token.filter(|token| is_usable_token(token)),
            response.user,
        )
    }

    /// Returns a copy of this session carrying refreshed credentials.
    ///
    /// A usable refresh token in the response replaces the stored one;
    /// otherwise the current refresh token is kept.
    #[must_use]
    pub fn refreshed(&self, response: RefreshResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|token| is_usable_token(token))
                .or_else(|| self.refresh_token.clone()),
            user: self.user.clone(),
        }
    }

    /// Returns the `Authorization` header value for this session.
    #[must_use]
    pub fn bearer(&self) -> String {
        bearer_header(&self.access_token)
    }

    /// Returns the access token's `exp` claim, when the token is a JWT.
    ///
    /// The claim is read without verifying the signature. It is informational
    /// only; the server's 401 remains the authority on expiry.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        decode_expiry(&self.access_token)
    }

    /// Returns `true` if both tokens can be placed in an `Authorization`
    /// header. Only such sessions are persisted.
    #[must_use]
    pub fn has_usable_tokens(&self) -> bool {
        is_usable_token(&self.access_token)
            && self.refresh_token.as_deref().map_or(true, is_usable_token)
    }

    /// Returns `true` if the access token carries an `exp` claim in the past.
    ///
    /// Opaque tokens are never considered expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires_at().is_some_and(|expires| Utc::now() > expires)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"*****")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("user", &self.user)
            .finish()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

/// Formats an access token as a bearer credential.
pub(crate) fn bearer_header(access_token: &str) -> String {
    format!("Bearer {access_token}")
}

/// Response body of `POST /auth/login`.
///
/// The profile fields sit at the top level next to the token, so the profile
/// is flattened in.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The new access token.
    pub access_token: String,

    /// A refresh token, when the server issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Everything else in the body.
    #[serde(flatten)]
    pub user: UserProfile,
}

/// Response body of `POST /auth/refresh-token`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// The replacement access token.
    pub access_token: String,

    /// A rotated refresh token, when the server issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A token is usable if it can be placed in an `Authorization` header.
pub(crate) fn is_usable_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(|c| c.is_whitespace() || c.is_control())
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT without checking its signature.
fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let header = jsonwebtoken::decode_header(token).ok()?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<ExpiryClaims>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .ok()?;

    Utc.timestamp_opt(data.claims.exp?, 0).single()
}
