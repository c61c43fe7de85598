//! Login, logout, and registration.
//!
//! [`SessionController`] is the user-facing half of the session lifecycle.
//! It talks to the auth endpoints, installs or clears the session through the
//! shared [`SessionContext`], and reports the outcome to the
//! [`SessionObserver`].
//!
//! # Example
//!
//! ```rust,ignore
//! use court_booking::BookingApp;
//!
//! let app = BookingApp::new(config)?;
//! let session = app.session();
//! session.restore();
//!
//! let user = session.login("a@x.com", "secret").await?;
//! println!("Signed in as {}", user.full_name());
//!
//! session.logout();
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::auth::observer::{Notice, Route, SessionObserver};
use crate::auth::session::{is_usable_token, LoginResponse};
use crate::auth::store::StorageError;
use crate::auth::{has_role, Role, Session, SessionContext, UserProfile};
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};

const LOGIN_PATH: &str = "auth/login";
const REGISTER_PLAYER_PATH: &str = "auth/register/player";

const LOGIN_FALLBACK: &str = "Failed to login. Please try again.";
const REGISTRATION_FALLBACK: &str = "Registration failed. Please try again.";

/// Errors returned by login and registration.
///
/// The `Display` output of every variant is the message shown to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was blank.
    #[error("{field} is required")]
    MissingField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// The server rejected the request.
    ///
    /// `message` is the server's message, or a generic fallback when it sent
    /// none.
    #[error("{message}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
        /// User-facing message.
        message: String,
    },

    /// The request could not be completed.
    #[error("{message}")]
    Http {
        /// User-facing message.
        message: String,
        /// The underlying failure.
        #[source]
        source: HttpError,
    },

    /// The new session could not be persisted.
    #[error("Failed to save session: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    fn from_http(error: HttpError, fallback: &str) -> Self {
        match error {
            HttpError::Response(e) => Self::Rejected {
                status: e.code,
                message: e.server_message.unwrap_or_else(|| fallback.to_string()),
            },
            source => Self::Http {
                message: fallback.to_string(),
                source,
            },
        }
    }
}

/// Outcome of checking whether the user may open a protected screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The persisted session has not been restored yet, or a login is in
    /// flight. Show a spinner.
    Pending,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in, but without the required role.
    Unauthorized,
    /// Allowed.
    Granted,
}

impl Access {
    /// Returns the route to redirect to, if access is refused.
    #[must_use]
    pub const fn redirect(self) -> Option<Route> {
        match self {
            Self::RedirectToLogin => Some(Route::Login),
            Self::Unauthorized => Some(Route::Unauthorized),
            Self::Pending | Self::Granted => None,
        }
    }
}

/// Self-registration details.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Sign-in email.
    pub email: String,
    /// Sign-in password.
    pub password: String,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Player registration details, as collected by the sign-up form.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRegistrationRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Sign-in email.
    pub email: String,
    /// Sign-in password.
    pub password: String,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Date of birth, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Self-assessed playing level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

fn require(field: &'static str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        Err(AuthError::MissingField { field })
    } else {
        Ok(())
    }
}

/// Counts an operation as in flight for as long as it lives.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Drives login, logout, and registration for one session context.
///
/// `is_authenticated` is read straight from the context, so it reflects a
/// teardown by the HTTP client immediately.
pub struct SessionController {
    context: Arc<SessionContext>,
    client: Arc<HttpClient>,
    observer: Arc<dyn SessionObserver>,
    restored: AtomicBool,
    in_flight: AtomicUsize,
}

// Verify SessionController is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionController>();
};

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("context", &self.context)
            .field("restored", &self.restored)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Creates a controller. It reports loading until [`restore`](Self::restore)
    /// is called.
    #[must_use]
    pub fn new(client: Arc<HttpClient>, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            context: Arc::clone(client.context()),
            client,
            observer,
            restored: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Returns the shared session context.
    #[must_use]
    pub const fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Loads the persisted session, if any, and ends the initial loading
    /// state.
    pub fn restore(&self) -> Option<Session> {
        let session = self.context.restore();
        if let Some(session) = &session {
            tracing::debug!("Restored session for user {}", session.user.id);
        }
        self.restored.store(true, Ordering::SeqCst);
        session
    }

    /// Returns `true` if a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.context.is_authenticated()
    }

    /// Returns `true` before [`restore`](Self::restore) and while a login or
    /// registration is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.restored.load(Ordering::SeqCst) || self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Returns the signed-in user.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.context.session().map(|session| session.user)
    }

    /// Decides whether the user may open a screen that requires `required`
    /// (or only a signed-in user, when `None`).
    #[must_use]
    pub fn authorize(&self, required: Option<&Role>) -> Access {
        if self.is_loading() {
            return Access::Pending;
        }

        match (self.context.session(), required) {
            (None, _) => Access::RedirectToLogin,
            (Some(session), Some(role)) if !has_role(&session, role) => Access::Unauthorized,
            (Some(_), _) => Access::Granted,
        }
    }

    /// Signs in with `email` and `password`.
    ///
    /// On success the session is installed, the user is welcomed, and the
    /// observer is sent to the dashboard. On failure a destructive notice is
    /// shown and the existing session, if any, is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if a field is blank, the server rejects the
    /// credentials, the request fails, or the session cannot be saved.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let _loading = InFlight::enter(&self.in_flight);

        match self.try_login(email, password).await {
            Ok(user) => {
                tracing::info!("User {} logged in", user.id);
                self.observer.notify(Notice::info(
                    "Login successful",
                    format!("Welcome back, {}!", user.first_name),
                ));
                self.observer.navigate(Route::Dashboard);
                Ok(user)
            }
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                self.observer
                    .notify(Notice::destructive("Login failed", e.to_string()));
                Err(e)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        require("Email", email)?;
        require("Password", password)?;

        let request = HttpRequest::builder(HttpMethod::Post, LOGIN_PATH)
            .json(&LoginRequest { email, password })
            .build()
            .map_err(|e| AuthError::from_http(e.into(), LOGIN_FALLBACK))?;

        let response = self
            .client
            .send_unauthenticated(request)
            .await
            .map_err(|e| AuthError::from_http(e, LOGIN_FALLBACK))?;

        let login: LoginResponse = response
            .json()
            .map_err(|e| AuthError::from_http(e, LOGIN_FALLBACK))?;

        if !is_usable_token(&login.access_token) {
            return Err(AuthError::Rejected {
                status: response.code,
                message: LOGIN_FALLBACK.to_string(),
            });
        }

        let session = Session::from_login_response(login);
        let user = session.user.clone();
        self.context.install(session)?;
        Ok(user)
    }

    /// Signs out.
    ///
    /// Clears the session locally without a network call, then says goodbye
    /// and sends the observer to the login screen. Calling it again leaves
    /// the same end state.
    pub fn logout(&self) {
        if self.context.teardown() {
            tracing::info!("User logged out");
        }
        self.observer.notify(Notice::info(
            "Logged out",
            "You've been successfully logged out",
        ));
        self.observer.navigate(Route::Login);
    }

    /// Registers a new account. No session is established.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if a required field is blank or the
    /// registration fails.
    pub async fn register(&self, data: &RegisterData) -> Result<(), AuthError> {
        let validated = require("First name", &data.first_name)
            .and_then(|()| require("Last name", &data.last_name))
            .and_then(|()| require("Email", &data.email))
            .and_then(|()| require("Password", &data.password));

        self.submit_registration(
            validated,
            data,
            "Please check your email to verify your account.",
        )
        .await
    }

    /// Registers a new player account. No session is established.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if a required field is blank or the
    /// registration fails.
    pub async fn register_player(&self, data: &PlayerRegistrationRequest) -> Result<(), AuthError> {
        let validated = require("First name", &data.first_name)
            .and_then(|()| require("Last name", &data.last_name))
            .and_then(|()| require("Email", &data.email))
            .and_then(|()| require("Password", &data.password));

        self.submit_registration(
            validated,
            data,
            "Your account has been created. Please check your email for verification.",
        )
        .await
    }

    async fn submit_registration<B: Serialize + Sync>(
        &self,
        validated: Result<(), AuthError>,
        body: &B,
        success_description: &str,
    ) -> Result<(), AuthError> {
        let _loading = InFlight::enter(&self.in_flight);

        let result = match validated {
            Ok(()) => self.send_registration(body).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!("Registration submitted");
                self.observer
                    .notify(Notice::info("Registration successful", success_description));
                self.observer.navigate(Route::Login);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                self.observer
                    .notify(Notice::destructive("Registration failed", e.to_string()));
                Err(e)
            }
        }
    }

    async fn send_registration<B: Serialize + Sync>(&self, body: &B) -> Result<(), AuthError> {
        let request = HttpRequest::builder(HttpMethod::Post, REGISTER_PLAYER_PATH)
            .json(body)
            .build()
            .map_err(|e| AuthError::from_http(e.into(), REGISTRATION_FALLBACK))?;

        self.client
            .send_unauthenticated(request)
            .await
            .map_err(|e| AuthError::from_http(e, REGISTRATION_FALLBACK))?;
        Ok(())
    }
}
