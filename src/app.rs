//! The application root that wires the session lifecycle together.

use std::sync::Arc;

use crate::auth::{
    CredentialStore, MemoryStorage, SessionContext, SessionController, SessionObserver,
    SessionStorage, TracingObserver,
};
use crate::clients::{HttpClient, HttpError};
use crate::config::ClientConfig;
use crate::services::{BookingService, CourtService, UserService};

/// Owns one session context and everything that shares it.
///
/// Build one per signed-in surface (window, kiosk, test). Nothing is global:
/// two apps never see each other's sessions.
///
/// # Example
///
/// ```rust
/// use court_booking::{BookingApp, ClientConfig};
///
/// let app = BookingApp::new(ClientConfig::default()).unwrap();
/// assert!(app.session().is_loading());
///
/// app.session().restore();
/// assert!(!app.session().is_loading());
/// assert!(!app.session().is_authenticated());
/// ```
#[derive(Debug)]
pub struct BookingApp {
    config: ClientConfig,
    client: Arc<HttpClient>,
    session: SessionController,
    bookings: BookingService,
    courts: CourtService,
    users: UserService,
}

// Verify BookingApp is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BookingApp>();
};

impl BookingApp {
    /// Creates an app with in-memory session storage and a logging observer.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        Self::with_parts(config, Arc::new(MemoryStorage::new()), Arc::new(TracingObserver))
    }

    /// Creates an app over the given storage backend and observer.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be created.
    pub fn with_parts(
        config: ClientConfig,
        storage: Arc<dyn SessionStorage>,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self, HttpError> {
        let store = CredentialStore::new(storage, config.storage_prefix());
        let context = Arc::new(SessionContext::new(store));
        let client = Arc::new(HttpClient::new(&config, context, Arc::clone(&observer))?);

        Ok(Self {
            session: SessionController::new(Arc::clone(&client), observer),
            bookings: BookingService::new(Arc::clone(&client)),
            courts: CourtService::new(Arc::clone(&client)),
            users: UserService::new(Arc::clone(&client)),
            client,
            config,
        })
    }

    /// Returns the configuration the app was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the shared HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Returns the session context.
    #[must_use]
    pub fn context(&self) -> &Arc<SessionContext> {
        self.client.context()
    }

    /// Returns the session controller.
    #[must_use]
    pub const fn session(&self) -> &SessionController {
        &self.session
    }

    /// Returns the booking service.
    #[must_use]
    pub const fn bookings(&self) -> &BookingService {
        &self.bookings
    }

    /// Returns the court service.
    #[must_use]
    pub const fn courts(&self) -> &CourtService {
        &self.courts
    }

    /// Returns the user service.
    #[must_use]
    pub const fn users(&self) -> &UserService {
        &self.users
    }
}
