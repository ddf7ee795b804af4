//! Authentication state shared by the wizard and the dashboard shell.
//!
//! A [`SessionContext`] is created explicitly from a [`SessionStore`] and
//! passed to whoever needs it. The wizard only writes to it, after a
//! successful registration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::domain::profile::UserProfile;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not read session file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not write session file `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("session file `{path}` is not valid JSON: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
    #[error("could not encode session: {0}")]
    Encode(#[source] serde_json::Error),
}

/// What a store hands back on load.
#[derive(Clone, Debug, Default)]
pub struct StoredSession {
    pub token: Option<SecretString>,
    pub user: Option<UserProfile>,
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<StoredSession, SessionError>;
    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    token: Mutex<Option<String>>,
    user: Mutex<Option<UserProfile>>,
}

impl InMemorySessionStore {
    pub fn token(&self) -> Option<String> {
        match self.token.lock() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn user(&self) -> Option<UserProfile> {
        match self.user.lock() {
            Ok(user) => user.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, token: Option<String>, user: Option<UserProfile>) {
        match self.token.lock() {
            Ok(mut slot) => *slot = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
        match self.user.lock() {
            Ok(mut slot) => *slot = user,
            Err(poisoned) => *poisoned.into_inner() = user,
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<StoredSession, SessionError> {
        Ok(StoredSession { token: self.token().map(SecretString::from), user: self.user() })
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        let token = session.token.as_ref().map(|token| token.expose_secret().to_string());
        self.set(token, session.user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.set(None, None);
        Ok(())
    }
}

/// JSON file holding `auth_token` and `user`.
///
/// A `user` entry that no longer decodes is discarded (and rewritten away)
/// while the token is kept.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<Value>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, file: &SessionFile) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| SessionError::Write { path: self.path.clone(), source })?;
        }
        let raw = serde_json::to_string_pretty(file).map_err(SessionError::Encode)?;
        fs::write(&self.path, raw)
            .map_err(|source| SessionError::Write { path: self.path.clone(), source })
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<StoredSession, SessionError> {
        if !self.path.exists() {
            return Ok(StoredSession::default());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|source| SessionError::Read { path: self.path.clone(), source })?;
        let file: SessionFile = serde_json::from_str(&raw)
            .map_err(|source| SessionError::Corrupt { path: self.path.clone(), source })?;

        let user = match file.user.clone().map(serde_json::from_value::<UserProfile>) {
            Some(Ok(user)) => Some(user),
            Some(Err(error)) => {
                warn!(
                    event_name = "session.user_discarded",
                    path = %self.path.display(),
                    error = %error,
                    "stored user profile could not be decoded; removing it"
                );
                self.write_file(&SessionFile { auth_token: file.auth_token.clone(), user: None })?;
                None
            }
            None => None,
        };

        Ok(StoredSession { token: file.auth_token.map(SecretString::from), user })
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        let user = session
            .user
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(SessionError::Encode)?;
        self.write_file(&SessionFile {
            auth_token: session.token.as_ref().map(|token| token.expose_secret().to_string()),
            user,
        })
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Write { path: self.path.clone(), source }),
        }
    }
}

/// Which top-level view the shell should present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellView {
    Registration,
    Dashboard,
}

/// Bearer token plus cached user profile, backed by a [`SessionStore`].
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    state: RwLock<StoredSession>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Loads whatever the store already holds.
    pub fn init(store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        let state = store.load()?;
        Ok(Self { store, state: RwLock::new(state) })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemorySessionStore::default()),
            state: RwLock::new(StoredSession::default()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|state| state.token.is_some())
    }

    pub fn token(&self) -> Option<SecretString> {
        self.read(|state| state.token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read(|state| state.user.clone())
    }

    pub fn shell_view(&self) -> ShellView {
        if self.is_authenticated() {
            ShellView::Dashboard
        } else {
            ShellView::Registration
        }
    }

    /// Stores a fresh token and profile, in memory and in the store.
    pub fn establish(
        &self,
        token: impl Into<String>,
        user: Option<UserProfile>,
    ) -> Result<(), SessionError> {
        let next = StoredSession { token: Some(SecretString::from(token.into())), user };
        self.store.save(&next)?;
        self.write(next);
        Ok(())
    }

    /// Replaces the cached profile, keeping the token.
    pub fn update_user(&self, user: UserProfile) -> Result<(), SessionError> {
        let next = StoredSession { token: self.token(), user: Some(user) };
        self.store.save(&next)?;
        self.write(next);
        Ok(())
    }

    /// Forgets token and profile. Memory is cleared even if the store fails.
    pub fn teardown(&self) -> Result<(), SessionError> {
        self.write(StoredSession::default());
        self.store.clear()
    }

    fn read<T>(&self, f: impl FnOnce(&StoredSession) -> T) -> T {
        match self.state.read() {
            Ok(state) => f(&state),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, next: StoredSession) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
