//! Session storage and management.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::Instant;

use tracing::debug;

use super::{SessionId, SessionState};
use crate::error::SupportDeskError;
use crate::Result;

/// Identifying triple of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: SessionId,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: SessionId,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// A chat session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique identifier, fixed at creation.
    pub id: SessionId,
    /// Application the session belongs to.
    pub app_name: String,
    /// User owning the session.
    pub user_id: String,
    /// Mutable state mapping.
    pub state: SessionState,
    /// Time when session was created.
    pub created_at: Instant,
    /// Time of the last state update.
    pub last_update: Instant,
}

impl Session {
    fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        state: SessionState,
    ) -> Self {
        let now = Instant::now();
        Self {
            id: SessionId::new(),
            app_name: app_name.into(),
            user_id: user_id.into(),
            state,
            created_at: now,
            last_update: now,
        }
    }

    /// The identifying triple of this session.
    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.app_name.clone(), self.user_id.clone(), self.id)
    }

    /// Update the last-update timestamp.
    pub fn touch(&mut self) {
        self.last_update = Instant::now();
    }
}

/// Thread-safe in-memory storage for sessions.
///
/// Sessions live for the lifetime of the store; there is no eviction,
/// expiry or persistence.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl SessionStore {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session holding a copy of `initial_state`.
    ///
    /// The identifier is freshly generated, so creation never collides
    /// with an existing session.
    pub fn create_session(
        &self,
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        initial_state: &SessionState,
    ) -> Result<Session> {
        let session = Session::new(app_name, user_id, initial_state.clone());
        let key = session.key();

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SupportDeskError::LockPoisoned)?;
        sessions.insert(key.clone(), session.clone());

        debug!(session = %key, "Session created");
        Ok(session)
    }

    /// Get a snapshot of the session identified by the triple.
    pub fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &SessionId,
    ) -> Result<Session> {
        self.get(&SessionKey::new(app_name, user_id, *session_id))
    }

    /// Get a snapshot of the session with the given key.
    pub fn get(&self, key: &SessionKey) -> Result<Session> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SupportDeskError::LockPoisoned)?;
        sessions
            .get(key)
            .cloned()
            .ok_or_else(|| SupportDeskError::SessionNotFound(key.to_string()))
    }

    /// Check if a session exists.
    pub fn contains(&self, key: &SessionKey) -> Result<bool> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SupportDeskError::LockPoisoned)?;
        Ok(sessions.contains_key(key))
    }

    /// Update a session using a closure.
    ///
    /// The closure runs under the write lock and its result is returned.
    /// The session's last-update time is refreshed only when the closure
    /// succeeds.
    pub fn update<F, T>(&self, key: &SessionKey, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SupportDeskError::LockPoisoned)?;

        let session = sessions
            .get_mut(key)
            .ok_or_else(|| SupportDeskError::SessionNotFound(key.to_string()))?;

        let out = f(session)?;
        session.touch();
        Ok(out)
    }

    /// Remove a session from the store, returning it.
    pub fn delete_session(&self, key: &SessionKey) -> Result<Session> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SupportDeskError::LockPoisoned)?;
        sessions
            .remove(key)
            .ok_or_else(|| SupportDeskError::SessionNotFound(key.to_string()))
    }

    /// List the ids of all sessions of one user in one application.
    pub fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<SessionId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SupportDeskError::LockPoisoned)?;
        Ok(sessions
            .keys()
            .filter(|k| k.app_name == app_name && k.user_id == user_id)
            .map(|k| k.session_id)
            .collect())
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
