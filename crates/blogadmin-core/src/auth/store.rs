//! Persistent storage for the single credential string.
//!
//! The store holds exactly one value. It is shared by every component of the
//! running process through the session manager.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Keychain service name
const SERVICE_NAME: &str = "blogadmin";

/// Token file name in the data directory
const TOKEN_FILE: &str = "token";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Storage cell for the credential.
pub trait TokenStore: Send + Sync {
    fn put(&self, credential: &str) -> Result<(), StoreError>;

    fn get(&self) -> Result<Option<String>, StoreError>;

    /// Remove the credential. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// Stores the credential in a single file, readable only by the owner.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn put(&self, credential: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies to new files; tighten one left by an older write
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(credential.as_bytes())?;

        debug!(path = ?self.path, "Credential written");
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = ?self.path, "Credential removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// OS keychain store
// ============================================================================

/// Stores the credential in the OS keychain, one entry per backend.
pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    /// `account` distinguishes backends; the base URL is used.
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry, StoreError> {
        Ok(Entry::new(SERVICE_NAME, &self.account)?)
    }
}

impl TokenStore for KeyringTokenStore {
    fn put(&self, credential: &str) -> Result<(), StoreError> {
        self.entry()?.set_password(credential)?;
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StoreError> {
        match self.entry()?.get_password() {
            Ok(credential) => Ok(Some(credential)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    credential: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            credential: Mutex::new(Some(credential.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn put(&self, credential: &str) -> Result<(), StoreError> {
        *self.credential.lock().unwrap_or_else(|e| e.into_inner()) = Some(credential.to_string());
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.credential.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.credential.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        assert_eq!(store.get().unwrap(), None);

        let credential = "eyJhbGciOiJIUzI1NiJ9.eyJleHAiOjF9.sig-with_odd+chars/==";
        store.put(credential).unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some(credential));
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileTokenStore::new(&nested);

        store.put("abc").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        store.clear().unwrap();
        store.put("abc").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        store.put("a-much-longer-first-credential").unwrap();
        store.put("short").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_file_store_empty_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), "").unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        store.put("abc").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), "old").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        store.put("new").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get().unwrap(), None);
        store.put("t1").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("t1"));
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);

        let seeded = MemoryTokenStore::with_credential("t2");
        assert_eq!(seeded.get().unwrap().as_deref(), Some("t2"));
    }
}
