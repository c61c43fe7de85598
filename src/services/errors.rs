//! Error types for the domain services.

use thiserror::Error;

use crate::clients::HttpError;

/// Errors returned by the booking, court, and user services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation acts on the signed-in user and nobody is signed in.
    #[error("User not authenticated")]
    NotAuthenticated,

    /// The underlying HTTP call failed.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ServiceError {
    /// Returns the HTTP status code, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.as_response().map(|e| e.code),
            Self::NotAuthenticated => None,
        }
    }
}
