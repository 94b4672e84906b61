use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::{StoreError, TokenStore};
use super::token;
use crate::api::ApiError;

/// Whether the client currently believes it holds a usable credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Backend answer about a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Credential still denotes an admin account
    Privileged,
    /// Credential was rejected
    Revoked,
}

/// Confirms with the backend that a credential is still accepted.
#[async_trait]
pub trait AccountVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Verification, ApiError>;
}

/// Process-wide session context.
///
/// Created once at start-up and passed by `Arc` to every component that
/// performs protected actions. Only this type changes the session state.
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    verifier: Arc<dyn AccountVerifier>,
    state_tx: watch::Sender<SessionState>,
    /// Bumped whenever a session ends or a new credential is installed, so a
    /// verification started for an older session cannot end the current one.
    generation: AtomicU64,
    verification: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>, verifier: Arc<dyn AccountVerifier>) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::Unauthenticated);
        Arc::new(Self {
            store,
            verifier,
            state_tx,
            generation: AtomicU64::new(0),
            verification: Mutex::new(None),
        })
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Watch session state changes (e.g. a background revocation).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Mark the session authenticated.
    ///
    /// The caller must already know a valid credential is stored.
    pub fn login(&self) {
        self.set_state(SessionState::Authenticated);
    }

    /// End the session: cancel verification, clear the store.
    ///
    /// Requests already holding the old credential are left to fail on
    /// their own.
    pub fn logout(&self) {
        self.cancel_verification();
        self.end_session();
    }

    /// Install a freshly issued credential and mark the session authenticated.
    pub fn begin(&self, credential: &str) -> Result<(), StoreError> {
        self.cancel_verification();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.store.put(credential)?;
        self.login();
        info!("Session started");
        Ok(())
    }

    /// Return the stored credential if it is present and unexpired.
    ///
    /// On success the session is marked authenticated and a background check
    /// against the backend is started; if the backend rejects the credential
    /// the session is ended later, without notifying this caller. Callers
    /// must still treat any 401 they receive as authoritative.
    pub fn validate(self: &Arc<Self>) -> Option<String> {
        let credential = self.current_credential()?;
        self.login();
        self.spawn_verification(credential.clone());
        Some(credential)
    }

    /// Like [`validate`](Self::validate), but waits for the backend check.
    ///
    /// A transport failure during the check keeps the session; only an
    /// explicit rejection ends it.
    pub async fn validate_verified(&self) -> Option<String> {
        let credential = self.current_credential()?;
        let generation = self.generation.load(Ordering::SeqCst);

        match self.verifier.verify(&credential).await {
            Ok(Verification::Privileged) => {
                self.login();
                Some(credential)
            }
            Ok(Verification::Revoked) => {
                self.revoke(generation);
                None
            }
            Err(e) => {
                warn!(error = %e, "Account verification failed, keeping session");
                self.login();
                Some(credential)
            }
        }
    }

    /// Expiry of the stored credential, if one can be decoded.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let credential = self.read_store()?;
        token::expires_at(&credential).ok()
    }

    /// Read the store; absent, unreadable or expired credentials end the session.
    fn current_credential(&self) -> Option<String> {
        match self.read_store() {
            Some(credential) if !token::is_expired(&credential, Utc::now()) => Some(credential),
            Some(_) => {
                debug!("Stored credential is expired or malformed");
                self.logout();
                None
            }
            None => {
                self.logout();
                None
            }
        }
    }

    fn read_store(&self) -> Option<String> {
        match self.store.get() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                None
            }
        }
    }

    fn spawn_verification(self: &Arc<Self>, credential: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, skipping account verification");
            return;
        };

        let generation = self.generation.load(Ordering::SeqCst);
        let verifier = Arc::clone(&self.verifier);
        let manager: Weak<Self> = Arc::downgrade(self);

        let handle = runtime.spawn(async move {
            let outcome = verifier.verify(&credential).await;
            let Some(manager) = manager.upgrade() else {
                return;
            };
            match outcome {
                Ok(Verification::Privileged) => debug!("Account verified"),
                Ok(Verification::Revoked) => manager.revoke(generation),
                Err(e) => warn!(error = %e, "Background account verification failed"),
            }
        });

        // The newest check supersedes any still running
        let previous = self.lock_verification().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// End the session if it is still the one a verification was started for.
    fn revoke(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Ignoring stale verification result");
            return;
        }
        info!("Backend rejected credential, logging out");
        self.end_session();
    }

    fn end_session(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored credential");
        }
        self.set_state(SessionState::Unauthenticated);
    }

    fn cancel_verification(&self) {
        if let Some(handle) = self.lock_verification().take() {
            handle.abort();
        }
    }

    fn lock_verification(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.verification.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: SessionState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            debug!(?state, "Session state changed");
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.cancel_verification();
    }
}
