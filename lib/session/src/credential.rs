//! Credential persistence for the bearer token.
//!
//! The store holds at most one opaque token; absence of a stored token is
//! the canonical logged-out representation. Storage trouble degrades to an
//! always-unauthenticated session: `load` answers `None` and writes become
//! no-ops, logged at `warn`. Nothing here inspects the token's shape.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Persistent storage for the single bearer token.
///
/// Only the session manager writes through this trait; screens read session
/// state, never the credential itself.
pub trait CredentialStore: Send + Sync {
    /// Persists the token, replacing any previous one.
    fn save(&self, token: &str);

    /// Returns the stored token, if any.
    fn load(&self) -> Option<String>;

    /// Discards the stored token.
    fn clear(&self);
}

/// Token file at a fixed path, typically under the user's config directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(error = %e, path = %self.path.display(), "failed to prepare credential directory");
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, token) {
            warn!(error = %e, path = %self.path.display(), "failed to persist credential");
        }
    }

    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to read credential");
                None
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(error = %e, path = %self.path.display(), "failed to discard credential");
            }
        }
    }
}

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, token: &str) {
        *self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        *self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
