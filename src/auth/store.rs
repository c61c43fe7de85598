//! Persistent credential storage.
//!
//! [`CredentialStore`] maps a [`Session`] onto three keys of a pluggable
//! [`SessionStorage`] backend:
//!
//! | key                       | value                          |
//! |---------------------------|--------------------------------|
//! | `<prefix>auth_token`      | access token                   |
//! | `<prefix>user_data`       | JSON-serialized [`UserProfile`] |
//! | `<prefix>refresh_token`   | refresh token, when present    |
//!
//! Two backends ship with the crate: [`MemoryStorage`] lives as long as the
//! process, [`FileStorage`] keeps the session in a JSON file so it survives a
//! restart.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use court_booking::auth::store::{CredentialStore, MemoryStorage};
//! use court_booking::{Session, UserProfile};
//!
//! let store = CredentialStore::new(Arc::new(MemoryStorage::new()), "tennis_");
//! let user: UserProfile = serde_json::from_str(r#"{"id":"u1"}"#).unwrap();
//! let session = Session::new("T1".to_string(), None, user);
//!
//! store.save(&session).unwrap();
//! assert_eq!(store.load(), Some(session));
//!
//! store.clear().unwrap();
//! assert_eq!(store.load(), None);
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::auth::session::is_usable_token;
use crate::auth::{Session, UserProfile};

/// Errors raised by a [`SessionStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("Session storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The session carries a token that could not be loaded back.
    #[error("Session has an empty or malformed token")]
    UnusableToken,
}

/// A single write applied as part of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageWrite<'a> {
    /// Sets `key` to `value`.
    Set(&'a str, &'a str),
    /// Removes `key`.
    Remove(&'a str),
}

/// A string key/value store scoped to one session context.
///
/// Implementations must be `Send + Sync`; the store is shared between the
/// HTTP client and the session controller.
pub trait SessionStorage: Send + Sync {
    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Applies all `writes`. Backends that can do so apply them as one unit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be written.
    fn write_batch(&self, writes: &[StorageWrite<'_>]) -> Result<(), StorageError>;

    /// Sets `key` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write_batch(&[StorageWrite::Set(key, value)])
    }

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.write_batch(&[StorageWrite::Remove(key)])
    }
}

fn apply_writes(map: &mut HashMap<String, String>, writes: &[StorageWrite<'_>]) {
    for write in writes {
        match *write {
            StorageWrite::Set(key, value) => {
                map.insert(key.to_string(), value.to_string());
            }
            StorageWrite::Remove(key) => {
                map.remove(key);
            }
        }
    }
}

/// In-memory storage that lasts as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write_batch(&self, writes: &[StorageWrite<'_>]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        apply_writes(&mut entries, writes);
        Ok(())
    }
}

/// Storage backed by a JSON object file.
///
/// Every batch rewrites the whole file through a uniquely named temporary
/// file in the same directory that is renamed into place, so readers never
/// observe a half-written file. A
/// missing file reads as empty. An unparsable file also reads as empty and is
/// replaced on the next write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file and its parent directories are created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(
                "Ignoring unreadable session file {}: {}",
                self.path.display(),
                e
            );
            HashMap::new()
        }))
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string(entries)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_entries()?.remove(key))
    }

    fn write_batch(&self, writes: &[StorageWrite<'_>]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        apply_writes(&mut entries, writes);
        self.write_entries(&entries)
    }
}

/// Key names derived from the configured prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
struct StorageKeys {
    token: String,
    user: String,
    refresh: String,
}

impl StorageKeys {
    fn new(prefix: &str) -> Self {
        Self {
            token: format!("{prefix}auth_token"),
            user: format!("{prefix}user_data"),
            refresh: format!("{prefix}refresh_token"),
        }
    }
}

/// Why a persisted session could not be loaded.
enum LoadFailure {
    Corrupt(&'static str),
    Storage(StorageError),
}

impl From<StorageError> for LoadFailure {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Maps a [`Session`] to and from a [`SessionStorage`] backend.
///
/// The store does no network access and holds no in-memory copy; the
/// [`crate::SessionContext`] owns the live session.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SessionStorage>,
    keys: StorageKeys,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a store writing to `backend` under keys prefixed with `prefix`.
    #[must_use]
    pub fn new(backend: Arc<dyn SessionStorage>, prefix: &str) -> Self {
        Self {
            backend,
            keys: StorageKeys::new(prefix),
        }
    }

    /// Returns the key holding the access token.
    #[must_use]
    pub fn token_key(&self) -> &str {
        &self.keys.token
    }

    /// Returns the key holding the serialized user profile.
    #[must_use]
    pub fn user_key(&self) -> &str {
        &self.keys.user
    }

    /// Returns the key holding the refresh token.
    #[must_use]
    pub fn refresh_key(&self) -> &str {
        &self.keys.refresh
    }

    /// Reads the persisted session.
    ///
    /// Returns `None` when nothing is stored. Data that does not form a valid
    /// session is purged and also reported as `None`; it is never surfaced as
    /// an error. A backend read failure is logged and treated as absent.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        match self.try_load() {
            Ok(session) => {
                if session.is_some() {
                    tracing::debug!("Loaded persisted session");
                }
                session
            }
            Err(LoadFailure::Corrupt(reason)) => {
                tracing::warn!("Purging corrupt persisted session: {}", reason);
                if let Err(e) = self.clear() {
                    tracing::error!("Failed to purge corrupt session: {}", e);
                }
                None
            }
            Err(LoadFailure::Storage(e)) => {
                tracing::error!("Failed to read persisted session: {}", e);
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<Session>, LoadFailure> {
        let token = self.backend.get(&self.keys.token)?;
        let user = self.backend.get(&self.keys.user)?;
        let refresh = self.backend.get(&self.keys.refresh)?;

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) if refresh.is_none() => return Ok(None),
            (None, None) => return Err(LoadFailure::Corrupt("refresh token without session")),
            (Some(_), None) => return Err(LoadFailure::Corrupt("token without user data")),
            (None, Some(_)) => return Err(LoadFailure::Corrupt("user data without token")),
        };

        if !is_usable_token(&token) {
            return Err(LoadFailure::Corrupt("access token is not a usable credential"));
        }
        if refresh.as_deref().is_some_and(|r| !is_usable_token(r)) {
            return Err(LoadFailure::Corrupt("refresh token is not a usable credential"));
        }

        let user: UserProfile = serde_json::from_str(&user)
            .map_err(|_| LoadFailure::Corrupt("user data is not a valid profile"))?;

        Ok(Some(Session::new(token, refresh, user)))
    }

    /// Persists `session`, overwriting any previous value.
    ///
    /// The refresh-token key is removed when the session carries none.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnusableToken`] without writing if a token is
    /// empty or malformed, and [`StorageError`] if the profile cannot be
    /// serialized or the backend cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        if !session.has_usable_tokens() {
            return Err(StorageError::UnusableToken);
        }
        let user = serde_json::to_string(&session.user)?;
        let refresh = session.refresh_token.as_deref().map_or(
            StorageWrite::Remove(&self.keys.refresh),
            |refresh| StorageWrite::Set(&self.keys.refresh, refresh),
        );

        self.backend.write_batch(&[
            StorageWrite::Set(&self.keys.token, &session.access_token),
            StorageWrite::Set(&self.keys.user, &user),
            refresh,
        ])?;
        tracing::debug!("Persisted session for user {}", session.user.id);
        Ok(())
    }

    /// Removes every persisted session key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.write_batch(&[
            StorageWrite::Remove(&self.keys.token),
            StorageWrite::Remove(&self.keys.user),
            StorageWrite::Remove(&self.keys.refresh),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn session(refresh: Option<&str>) -> Session {
        let user = UserProfile {
            id: "u1".to_string(),
            email: "a@x.com".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            roles: [Role::Player].into_iter().collect(),
            profile_image_url: None,
        };
        Session::new("T1".to_string(), refresh.map(String::from), user)
    }

    fn memory_store() -> (Arc<MemoryStorage>, CredentialStore) {
        let backend = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(backend.clone(), "tennis_");
        (backend, store)
    }

    #[test]
    fn test_keys_use_prefix() {
        let (_, store) = memory_store();
        assert_eq!(store.token_key(), "tennis_auth_token");
        assert_eq!(store.user_key(), "tennis_user_data");
        assert_eq!(store.refresh_key(), "tennis_refresh_token");
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (_, store) = memory_store();
        let original = session(Some("R1"));

        store.save(&original).unwrap();
        assert_eq!(store.load(), Some(original));
    }

    #[test]
    fn test_load_returns_none_when_empty() {
        let (backend, store) = memory_store();
        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_save_without_refresh_token_removes_stale_key() {
        let (backend, store) = memory_store();
        store.save(&session(Some("R1"))).unwrap();
        store.save(&session(None)).unwrap();

        assert_eq!(backend.get("tennis_refresh_token").unwrap(), None);
        assert_eq!(store.load().unwrap().refresh_token, None);
    }

    #[test]
    fn test_garbage_is_purged_and_treated_as_absent() {
        let (backend, store) = memory_store();
        backend.set("tennis_auth_token", "\u{0}\u{1}garbage\n").unwrap();
        backend.set("tennis_user_data", "{not json").unwrap();

        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_user_data_that_is_not_a_profile_is_purged() {
        let (backend, store) = memory_store();
        backend.set("tennis_auth_token", "T1").unwrap();
        backend.set("tennis_user_data", "[1,2,3]").unwrap();

        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_half_written_session_is_purged() {
        let (backend, store) = memory_store();
        backend.set("tennis_auth_token", "T1").unwrap();

        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_clear_leaves_other_keys_alone() {
        let (backend, store) = memory_store();
        backend.set("theme", "dark").unwrap();
        store.save(&session(Some("R1"))).unwrap();

        store.clear().unwrap();

        assert_eq!(backend.len(), 1);
        assert_eq!(backend.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let original = session(Some("R1"));

        CredentialStore::new(Arc::new(FileStorage::new(&path)), "tennis_")
            .save(&original)
            .unwrap();

        let reopened = CredentialStore::new(Arc::new(FileStorage::new(&path)), "tennis_");
        assert_eq!(reopened.load(), Some(original));
    }

    #[test]
    fn test_file_storage_treats_unparsable_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "definitely not json").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("tennis_auth_token").unwrap(), None);

        storage.set("tennis_auth_token", "T1").unwrap();
        assert_eq!(storage.get("tennis_auth_token").unwrap().as_deref(), Some("T1"));
    }

    #[test]
    fn test_file_storage_clear_removes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
        let store = CredentialStore::new(storage.clone(), "tennis_");

        store.save(&session(None)).unwrap();
        store.clear().unwrap();

        assert_eq!(storage.get("tennis_auth_token").unwrap(), None);
        assert_eq!(storage.get("tennis_user_data").unwrap(), None);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_refuses_session_that_would_not_load() {
        let (backend, store) = memory_store();

        let result = store.save(&session(Some("")));

        assert!(matches!(result, Err(StorageError::UnusableToken)));
        assert!(backend.is_empty());
    }

    #[test]
    fn test_login_with_empty_refresh_token_round_trips() {
        let (_, store) = memory_store();
        let response: crate::auth::LoginResponse = serde_json::from_str(
            r#"{"accessToken":"T1","refreshToken":"","id":"u1","firstName":"A"}"#,
        )
        .unwrap();
        let original = Session::from_login_response(response);

        store.save(&original).unwrap();
        assert_eq!(store.load(), Some(original));
    }

    #[test]
    fn test_file_storage_instances_on_same_path_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let storage = FileStorage::new(&path);
                std::thread::spawn(move || {
                    for n in 0..20 {
                        storage.set(&format!("key{i}"), &n.to_string()).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<HashMap<String, String>>(&content).is_ok());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
