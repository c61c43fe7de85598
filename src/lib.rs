//! # Court Booking Client
//!
//! An async client for a tennis-court booking REST API: sign-in, court
//! browsing, and booking management, built around a session lifecycle with
//! transparent access-token refresh.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Session persistence through a pluggable [`SessionStorage`] backend
//! - Login, logout, and registration via [`SessionController`]
//! - An HTTP client that refreshes an expired access token once and retries
//! - Typed booking, court, and user services in [`services`]
//!
//! ## Quick Start
//!
//! ```rust
//! use court_booking::{ApiBaseUrl, BookingApp, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("http://localhost:8080/api").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let app = BookingApp::new(config).unwrap();
//! app.session().restore();
//! ```
//!
//! ## Signing In
//!
//! ```rust,ignore
//! let user = app.session().login("a@x.com", "secret").await?;
//! println!("Welcome back, {}!", user.first_name);
//!
//! // Every service call now carries the bearer token
//! let bookings = app.bookings().user_upcoming_bookings().await?;
//! ```
//!
//! ## Session Expiry
//!
//! When a request gets 401, the client exchanges the refresh token for a new
//! access token and resends the request once. If that fails, the session is
//! cleared and the [`SessionObserver`] is told the session expired and asked
//! to show the login screen. Concurrent failures share one refresh and
//! produce one redirect.
//!
//! ## Persistence
//!
//! ```rust
//! use std::sync::Arc;
//! use court_booking::{BookingApp, ClientConfig, FileStorage, TracingObserver};
//!
//! let dir = std::env::temp_dir().join("court-booking-doc");
//! let app = BookingApp::with_parts(
//!     ClientConfig::default(),
//!     Arc::new(FileStorage::new(dir.join("session.json"))),
//!     Arc::new(TracingObserver),
//! )
//! .unwrap();
//!
//! // Picks up a session saved by a previous run, if any
//! app.session().restore();
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: every session lives in one [`SessionContext`]
//!   owned by a [`BookingApp`]
//! - **Fail-fast validation**: config newtypes validate on construction
//! - **Thread-safe**: all types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio async runtime

mod app;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod services;

pub use app::BookingApp;

// Re-export public types at crate root for convenience
pub use auth::{
    has_role, Access, AuthError, CredentialStore, FileStorage, MemoryStorage, Notice, NoticeKind,
    PlayerRegistrationRequest, RefreshError, RegisterData, Role, Route, Session, SessionContext,
    SessionController, SessionObserver, SessionStorage, StorageError, TracingObserver,
    UserProfile,
};
pub use config::{ApiBaseUrl, ClientConfig, ClientConfigBuilder};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError,
};

// Re-export service types
pub use services::ServiceError;
