//! Session and authentication lifecycle.
//!
//! # Overview
//!
//! - [`Session`]: the access token, optional refresh token, and user profile
//! - [`UserProfile`] and [`Role`]: who is signed in and what they may do
//! - [`store`]: persisting a session through a [`SessionStorage`] backend
//! - [`SessionContext`]: the shared owner of the live session and its
//!   `Authorization` header
//! - [`refresh`]: exchanging a refresh token for a new access token
//! - [`SessionController`]: login, logout, and registration
//! - [`observer`]: notices and navigation handed to the view layer
//!
//! # Lifecycle
//!
//! A session is restored from storage at startup, created by
//! [`SessionController::login`], refreshed by the HTTP client when a request
//! gets 401, and destroyed by [`SessionController::logout`] or by a failed
//! refresh.
//!
//! # Example
//!
//! ```rust
//! use court_booking::{has_role, Role, Session, UserProfile};
//!
//! let user: UserProfile =
//!     serde_json::from_str(r#"{"id":"u1","firstName":"A","roles":["ADMIN"]}"#).unwrap();
//! let session = Session::new("T1".to_string(), None, user);
//!
//! assert!(has_role(&session, &Role::Admin));
//! assert!(!has_role(&session, &Role::Coach));
//! ```

pub mod context;
pub mod controller;
pub mod observer;
pub mod refresh;
mod roles;
pub mod session;
pub mod store;
mod user_profile;

pub use context::SessionContext;
pub use controller::{Access, AuthError, PlayerRegistrationRequest, RegisterData, SessionController};
pub use observer::{Notice, NoticeKind, Route, SessionObserver, TracingObserver};
pub use refresh::RefreshError;
pub use roles::{has_role, Role};
pub use session::{LoginResponse, RefreshResponse, Session};
pub use store::{CredentialStore, FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use user_profile::UserProfile;

pub(crate) use user_profile::deserialize_id;
