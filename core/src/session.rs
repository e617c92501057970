//! Credential Holder and the session context that carries it.
//!
//! # Design
//! The token is opaque: nothing here inspects or validates it. A
//! `CredentialStore` persists exactly one token value; hosts decide where
//! (memory, a file, a keychain). `SessionContext` is the explicit handle
//! passed into the API layer and the dashboard instead of any ambient
//! global lookup. Store operations never fail from the caller's point of
//! view: an unreadable store simply has no credential.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::error::ApiError;

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// The `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Persists a single credential across restarts of the host.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: Credential);
    fn clear(&self);
}

/// Process-local store. Survives nothing, which is what tests want.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }

    fn set(&self, credential: Credential) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(credential);
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

/// Shared handle over the credential store.
///
/// Created once by the host and cloned into every component that needs the
/// credential. `begin` is the login edge, `end` the logout edge.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// A session backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    /// The current credential, or `Unauthenticated` when there is none.
    pub fn credential(&self) -> Result<Credential, ApiError> {
        self.store
            .get()
            .ok_or_else(|| ApiError::Unauthenticated(Some("no credential; log in first".to_string())))
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_some()
    }

    pub fn begin(&self, credential: Credential) {
        info!("session started");
        self.store.set(credential);
    }

    pub fn end(&self) {
        info!("session ended");
        self.store.clear();
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
