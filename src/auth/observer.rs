//! Hooks into the view layer.
//!
//! The session lifecycle needs to show messages and move the user between
//! screens, but rendering and routing live outside this crate. A
//! [`SessionObserver`] receives those side effects.

use std::fmt;

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational or success message.
    Info,
    /// Failure the user should act on.
    Destructive,
}

/// A user-visible message, typically rendered as a toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Short headline.
    pub title: String,
    /// Longer explanation.
    pub description: String,
}

impl Notice {
    /// Creates an informational notice.
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Creates a destructive notice.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }

    /// The notice shown when a session cannot be refreshed.
    #[must_use]
    pub fn session_expired() -> Self {
        Self::destructive("Session expired", "Please login again to continue")
    }
}

/// Screens the session lifecycle navigates to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public landing page.
    Landing,
    /// Login screen.
    Login,
    /// Signed-in home screen.
    Dashboard,
    /// Shown when the user lacks a required role.
    Unauthorized,
}

impl Route {
    /// Returns the route path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Unauthorized => "/unauthorized",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives the user-facing side effects of the session lifecycle.
///
/// Calls are made synchronously from whichever task triggered them, so
/// implementations should hand work off rather than block.
pub trait SessionObserver: Send + Sync {
    /// Shows `notice` to the user.
    fn notify(&self, notice: Notice);

    /// Moves the user to `route`.
    fn navigate(&self, route: Route);
}

/// Observer that only logs. Used when no view layer is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => tracing::info!("{}: {}", notice.title, notice.description),
            NoticeKind::Destructive => tracing::warn!("{}: {}", notice.title, notice.description),
        }
    }

    fn navigate(&self, route: Route) {
        tracing::info!("Navigate to {}", route);
    }
}
