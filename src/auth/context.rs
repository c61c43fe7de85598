//! The per-application session context.
//!
//! [`SessionContext`] is the single owner of session state: the persisted
//! [`CredentialStore`], the live [`Session`], and the default
//! `Authorization` header value. The HTTP client and the session controller
//! share it through an `Arc`; nothing in the crate keeps session state
//! anywhere else.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{Mutex, MutexGuard};

use crate::auth::session::{bearer_header, RefreshResponse};
use crate::auth::store::{CredentialStore, StorageError};
use crate::auth::Session;

#[derive(Debug, Default)]
struct ContextState {
    session: Option<Session>,
    authorization: Option<String>,
}

impl ContextState {
    fn set(&mut self, session: Option<Session>) {
        self.authorization = session.as_ref().map(Session::bearer);
        self.session = session;
    }
}

/// Owns the session state shared by the HTTP client and session controller.
///
/// Every mutation writes the credential store and updates the in-memory
/// session and header while holding the same write lock, so a request can
/// never read a header that disagrees with what is persisted.
///
/// # Lifecycle
///
/// 1. [`SessionContext::new`] starts empty.
/// 2. [`SessionContext::restore`] loads any persisted session.
/// 3. [`SessionContext::install`] / [`SessionContext::apply_refresh`]
///    replace the session.
/// 4. [`SessionContext::teardown`] clears everything.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use court_booking::auth::store::{CredentialStore, MemoryStorage};
/// use court_booking::{Session, SessionContext, UserProfile};
///
/// let store = CredentialStore::new(Arc::new(MemoryStorage::new()), "tennis_");
/// let context = SessionContext::new(store);
///
/// let user: UserProfile = serde_json::from_str(r#"{"id":"u1"}"#).unwrap();
/// context.install(Session::new("T1".to_string(), None, user)).unwrap();
/// assert_eq!(context.authorization_header().as_deref(), Some("Bearer T1"));
///
/// assert!(context.teardown());
/// assert!(context.authorization_header().is_none());
/// ```
#[derive(Debug)]
pub struct SessionContext {
    store: CredentialStore,
    state: RwLock<ContextState>,
    refresh_gate: Mutex<()>,
}

// Verify SessionContext is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionContext>();
};

impl SessionContext {
    /// Creates an empty context over `store`.
    ///
    /// Call [`restore`](Self::restore) to pick up a persisted session.
    #[must_use]
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            state: RwLock::new(ContextState::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ContextState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContextState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the credential store.
    #[must_use]
    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Loads the persisted session into the context.
    ///
    /// Corrupt persisted data is purged by the store and yields `None`.
    pub fn restore(&self) -> Option<Session> {
        let mut state = self.write();
        let session = self.store.load();
        state.set(session.clone());
        session
    }

    /// Returns a snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }

    /// Returns `true` if a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().session.is_some()
    }

    /// Returns the current access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read()
            .session
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    /// Returns the current refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read()
            .session
            .as_ref()
            .and_then(|session| session.refresh_token.clone())
    }

    /// Returns the default `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.read().authorization.clone()
    }

    /// Replaces the current session with `session`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the session cannot be persisted. The
    /// context is left unchanged in that case.
    pub fn install(&self, session: Session) -> Result<(), StorageError> {
        let mut state = self.write();
        self.store.save(&session)?;
        state.set(Some(session));
        Ok(())
    }

    /// Applies refreshed credentials to the session that `refreshed_from`
    /// belongs to.
    ///
    /// Returns the new access token, or `None` if the current session no
    /// longer holds `refreshed_from` (the user logged out, or logged in as
    /// someone else, while the refresh was in flight). A refresh never
    /// resurrects a cleared session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the refreshed session cannot be persisted.
    /// The context is left unchanged in that case.
    pub fn apply_refresh(
        &self,
        refreshed_from: &str,
        response: RefreshResponse,
    ) -> Result<Option<String>, StorageError> {
        let mut state = self.write();
        let Some(current) = state
            .session
            .as_ref()
            .filter(|session| session.refresh_token.as_deref() == Some(refreshed_from))
        else {
            return Ok(None);
        };

        let refreshed = current.refreshed(response);
        self.store.save(&refreshed)?;
        let token = refreshed.access_token.clone();
        state.authorization = Some(bearer_header(&token));
        state.session = Some(refreshed);
        Ok(Some(token))
    }

    /// Clears the session, the persisted store, and the default header.
    ///
    /// Returns `true` if a session was active. Clearing an empty context is
    /// a no-op apart from re-clearing the store.
    pub fn teardown(&self) -> bool {
        let mut state = self.write();
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear persisted session: {}", e);
        }
        let was_active = state.session.is_some();
        state.set(None);
        was_active
    }

    /// Waits for exclusive use of the refresh path.
    ///
    /// Holding the guard serializes refresh attempts so that concurrent 401s
    /// share one refresh call.
    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_gate.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{MemoryStorage, SessionStorage};
    use crate::auth::UserProfile;
    use std::sync::Arc;

    fn user() -> UserProfile {
        serde_json::from_str(r#"{"id":"u1","firstName":"A"}"#).unwrap()
    }

    fn context() -> (Arc<MemoryStorage>, SessionContext) {
        let backend = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(backend.clone(), "tennis_");
        (backend, SessionContext::new(store))
    }

    #[test]
    fn test_new_context_is_empty() {
        let (_, context) = context();
        assert!(!context.is_authenticated());
        assert!(context.session().is_none());
        assert!(context.authorization_header().is_none());
    }

    #[test]
    fn test_install_updates_store_and_header_together() {
        let (backend, context) = context();
        context
            .install(Session::new("T1".to_string(), Some("R1".to_string()), user()))
            .unwrap();

        assert_eq!(context.authorization_header().as_deref(), Some("Bearer T1"));
        assert_eq!(
            backend.get("tennis_auth_token").unwrap().as_deref(),
            Some("T1")
        );
        assert_eq!(context.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn test_restore_picks_up_persisted_session() {
        let (backend, context) = context();
        let session = Session::new("T1".to_string(), None, user());
        CredentialStore::new(backend, "tennis_").save(&session).unwrap();

        assert_eq!(context.restore(), Some(session));
        assert_eq!(context.authorization_header().as_deref(), Some("Bearer T1"));
    }

    #[test]
    fn test_apply_refresh_replaces_access_token() {
        let (backend, context) = context();
        context
            .install(Session::new("T1".to_string(), Some("R1".to_string()), user()))
            .unwrap();

        let token = context
            .apply_refresh(
                "R1",
                RefreshResponse {
                    access_token: "T2".to_string(),
                    refresh_token: None,
                },
            )
            .unwrap();

        assert_eq!(token.as_deref(), Some("T2"));
        assert_eq!(context.authorization_header().as_deref(), Some("Bearer T2"));
        assert_eq!(
            backend.get("tennis_auth_token").unwrap().as_deref(),
            Some("T2")
        );
        assert_eq!(context.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn test_apply_refresh_does_not_resurrect_cleared_session() {
        let (backend, context) = context();

        let token = context
            .apply_refresh(
                "R1",
                RefreshResponse {
                    access_token: "T2".to_string(),
                    refresh_token: None,
                },
            )
            .unwrap();

        assert!(token.is_none());
        assert!(!context.is_authenticated());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_apply_refresh_ignores_other_session() {
        let (_, context) = context();
        context
            .install(Session::new("T9".to_string(), Some("R9".to_string()), user()))
            .unwrap();

        let token = context
            .apply_refresh(
                "R1",
                RefreshResponse {
                    access_token: "T2".to_string(),
                    refresh_token: None,
                },
            )
            .unwrap();

        assert!(token.is_none());
        assert_eq!(context.access_token().as_deref(), Some("T9"));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let (backend, context) = context();
        context
            .install(Session::new("T1".to_string(), None, user()))
            .unwrap();

        assert!(context.teardown());
        assert!(!context.teardown());
        assert!(backend.is_empty());
        assert!(context.authorization_header().is_none());
    }
}
