//! Connection registry
//!
//! The presence arena: a stable map from connection identity to [`Session`],
//! owned solely by the relay. Entries are inserted on join and removed
//! synchronously on disconnect, never lazily.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result};

/// Opaque identity of one live connection, stable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server-side record of one connected, joined user
///
/// Created on join, destroyed on disconnect, never otherwise mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: ConnectionId,
    /// Free text, not required unique
    pub display_name: String,
    /// Elevated presentation flag; confers no authorization
    pub elevated: bool,
}

/// Live collection of sessions, keyed by connection identity
///
/// Join order is preserved for presence snapshots. No interior locking;
/// the relay is the single owner.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ConnectionId, Session>,
    order: Vec<ConnectionId>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new session for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRegistration`] if the connection is already
    /// registered (idempotency guard).
    pub fn register(
        &mut self,
        id: ConnectionId,
        display_name: impl Into<String>,
        elevated: bool,
    ) -> Result<Session> {
        if self.sessions.contains_key(&id) {
            return Err(Error::DuplicateRegistration(id));
        }

        let session = Session {
            id,
            display_name: display_name.into(),
            elevated,
        };
        self.sessions.insert(id, session.clone());
        self.order.push(id);
        Ok(session)
    }

    /// Look up a session without side effects.
    #[must_use]
    pub fn lookup(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Remove and return the session for `id`.
    ///
    /// A connection that never joined is a no-op (`None`), not an error.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        self.order.retain(|c| *c != id);
        Some(session)
    }

    /// Presence snapshot in join order, for broadcasts to new joiners.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Session> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id).cloned())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
