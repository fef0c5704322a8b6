//! Shared translation credential
//!
//! One process-wide API key for the translation engine, scoped to the
//! whole room. The first client to supply one wins; later implicit
//! writes are ignored. Only the explicit set path replaces an existing
//! value. No expiry; cleared only by process restart or explicit
//! replacement.

use std::sync::RwLock;

/// Process-wide credential cell, handed to the relay at construction
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Option<String>>,
}

impl CredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a credential already known at startup.
    #[must_use]
    pub fn seeded(credential: Option<String>) -> Self {
        Self {
            inner: RwLock::new(credential),
        }
    }

    /// Current credential, if any.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Store `credential` only if none is set yet. Returns whether this
    /// caller won the first write.
    pub fn put_if_absent(&self, credential: &str) -> bool {
        // Fast path: read-lock
        if self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
        {
            return false;
        }
        let mut w = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Re-check after acquiring the write lock (another task may have won)
        if w.is_some() {
            return false;
        }
        *w = Some(credential.to_string());
        true
    }

    /// Unconditionally replace the stored credential (the explicit set
    /// path, distinct from the first-write-wins path).
    pub fn replace(&self, credential: &str) {
        *self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(credential.to_string());
    }
}
