//! Credential storage
//!
//! The credential is the only piece of authentication state the console keeps: an opaque
//! bearer token with a fixed expiry horizon. Stores report an expired credential as absent
//! and remove it on the way.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Default credential lifetime
pub const CREDENTIAL_TTL_DAYS: i64 = 7;

/// Opaque bearer token plus its expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token issued by `/auth/login`
    pub token: String,
    /// Instant after which the credential reads as absent
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Issue a credential for `token` that expires `ttl_days` after `now`
    #[must_use]
    pub fn issue(token: impl Into<String>, ttl_days: i64, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: now + Duration::days(ttl_days),
        }
    }

    /// Whether the credential is past its expiry at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// `Authorization` header value
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Backing storage for the credential
pub trait CredentialStore: Send + Sync {
    /// Read the raw stored credential, expired or not
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn load(&self) -> crate::Result<Option<Credential>>;

    /// Replace the stored credential
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn save(&self, credential: &Credential) -> crate::Result<()>;

    /// Remove the stored credential; removing nothing is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn clear(&self) -> crate::Result<()>;

    /// The credential as of `now`, dropping it from storage if it has expired
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or cleared.
    fn current_at(&self, now: DateTime<Utc>) -> crate::Result<Option<Credential>> {
        match self.load()? {
            Some(credential) if credential.is_expired_at(now) => {
                debug!(expired_at = %credential.expires_at, "Stored credential expired");
                self.clear()?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// The credential as of now
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or cleared.
    fn current(&self) -> crate::Result<Option<Credential>> {
        self.current_at(Utc::now())
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for &T {
    fn load(&self) -> crate::Result<Option<Credential>> {
        (**self).load()
    }

    fn save(&self, credential: &Credential) -> crate::Result<()> {
        (**self).save(credential)
    }

    fn clear(&self) -> crate::Result<()> {
        (**self).clear()
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn load(&self) -> crate::Result<Option<Credential>> {
        (**self).load()
    }

    fn save(&self, credential: &Credential) -> crate::Result<()> {
        (**self).save(credential)
    }

    fn clear(&self) -> crate::Result<()> {
        (**self).clear()
    }
}

/// Credential kept in process memory; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<Credential>>>,
}

impl MemoryCredentialStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `credential`
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(credential))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> crate::Result<Option<Credential>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &Credential) -> crate::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> crate::Result<()> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

/// Credential persisted as a small JSON file readable only by the owner
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the credential file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    fn write_private(&self, contents: &[u8]) -> std::io::Result<()> {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)?;
        file.write_all(contents)
    }

    #[cfg(not(unix))]
    fn write_private(&self, contents: &[u8]) -> std::io::Result<()> {
        std::fs::write(&self.path, contents)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> crate::Result<Option<Credential>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(credential) => Ok(Some(credential)),
            Err(err) => {
                // An unreadable credential is the same as no credential.
                warn!(path = %self.path.display(), error = %err, "Discarding malformed credential file");
                Ok(None)
            }
        }
    }

    fn save(&self, credential: &Credential) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_vec_pretty(credential)?;
        self.write_private(&contents)?;
        debug!(path = %self.path.display(), expires_at = %credential.expires_at, "Credential saved");
        Ok(())
    }

    fn clear(&self) -> crate::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
