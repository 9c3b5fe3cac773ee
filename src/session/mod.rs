//! Lifecycle of the unlocked vault key.
//!
//! A [`VaultSession`] owns the key between an unlock and a lock. Callers take a
//! [`KeyLease`] and pass it back on every encrypt/decrypt; the session checks the
//! lease generation before handing the key to the cipher, so once [`VaultSession::lock`]
//! has run no new operation can start with a stale copy. Operations that already
//! passed the check are allowed to finish.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{Result, StashError};
use crate::vault::crypto::{self, EncryptedEnvelope, VaultKey};

#[derive(Default)]
struct SessionState {
    key: Option<Arc<VaultKey>>,
    generation: u64,
}

/// Process-wide holder of the vault key with an explicit unlock/lock lifecycle.
#[derive(Default)]
pub struct VaultSession {
    state: RwLock<SessionState>,
}

/// Handle to the key as it was at a given generation.
#[derive(Clone)]
pub struct KeyLease {
    key: Arc<VaultKey>,
    generation: u64,
}

impl KeyLease {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for KeyLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLease")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl VaultSession {
    /// A locked session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that starts out unlocked with `key`.
    pub fn unlocked(key: VaultKey) -> Self {
        let session = Self::new();
        session.unlock(key);
        session
    }

    /// Install a key. Any lease from a previous generation becomes invalid.
    pub fn unlock(&self, key: VaultKey) -> u64 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.key = Some(Arc::new(key));
        debug!(generation = state.generation, "vault unlocked");
        state.generation
    }

    /// Drop the key. The bytes are wiped once the last in-flight lease is released.
    pub fn lock(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.key.take().is_some() {
            state.generation += 1;
            debug!(generation = state.generation, "vault locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .key
            .is_some()
    }

    pub fn generation(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Borrow the current key for a batch of operations.
    pub fn lease(&self) -> Result<KeyLease> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let key = state
            .key
            .as_ref()
            .ok_or_else(|| StashError::InvalidKey("vault is locked".into()))?;
        Ok(KeyLease {
            key: Arc::clone(key),
            generation: state.generation,
        })
    }

    /// Encrypt with a lease, refusing if the session moved on since it was taken.
    pub fn encrypt(&self, lease: &KeyLease, plaintext: &str) -> Result<EncryptedEnvelope> {
        self.check_lease(lease)?;
        crypto::encrypt(&lease.key, plaintext)
    }

    /// Decrypt with a lease, refusing if the session moved on since it was taken.
    pub fn decrypt(&self, lease: &KeyLease, envelope: &EncryptedEnvelope) -> Result<String> {
        self.check_lease(lease)?;
        crypto::decrypt(&lease.key, envelope)
    }

    fn check_lease(&self, lease: &KeyLease) -> Result<()> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.key.is_none() || state.generation != lease.generation {
            return Err(StashError::InvalidKey(
                "vault key was cleared; unlock again".into(),
            ));
        }
        Ok(())
    }
}
