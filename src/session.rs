//! Authenticated-session lifecycle for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` is the only writer of the session. Route guards and the API
//! client read it; login, signup, restore and logout mutate it. It is built
//! once at startup and shared as an `Arc`.
//!
//! INVARIANTS
//! ==========
//! - The in-memory session, the persisted credential and the bearer header
//!   change together under one lock, so a reader never sees a session
//!   without its header or the reverse.
//! - The identity is always the decoded payload of the credential.
//! - Exchanges are serialized per store. Logout bumps a generation counter;
//!   an exchange that started under an older generation is dropped.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::header::{HeaderValue, InvalidHeaderValue};

use crate::identity::{self, DecodeError, Identity};
use crate::net::auth::{AuthService, AuthServiceError};
use crate::net::types::AuthGrant;
use crate::routes::AppPath;
use crate::storage::{KeyValueStore, StorageError, TOKEN_KEY};

// =============================================================================
// TYPES
// =============================================================================

/// Credential paired with the identity decoded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: String,
    pub identity: Identity,
}

/// Navigation side effect triggered by logout.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: AppPath);
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("authentication failed (status {status}): {message}")]
    Authentication { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication service returned an unexpected response: {0}")]
    Contract(String),
    #[error("credential decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("credential could not be persisted: {0}")]
    Storage(#[from] StorageError),
    #[error("credential is not a valid header value")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("logged out while the exchange was in flight")]
    Superseded,
    #[error("no active session")]
    NoSession,
}

impl From<AuthServiceError> for SessionError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Rejected { status, message } => Self::Authentication { status, message },
            AuthServiceError::Network(msg) => Self::Network(msg),
            AuthServiceError::Contract(msg) => Self::Contract(msg),
        }
    }
}

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    authorization: Option<HeaderValue>,
    generation: u64,
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    inner: RwLock<Inner>,
    exchange: tokio::sync::Mutex<()>,
}

impl SessionStore {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthService>, storage: Arc<dyn KeyValueStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            storage,
            navigator,
            inner: RwLock::new(Inner::default()),
            exchange: tokio::sync::Mutex::new(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Readers
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().session.is_some()
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.read().session.clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.read().session.as_ref().map(|s| s.identity.clone())
    }

    /// The active session, for callers that are only reachable while signed in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSession`] when nobody is signed in.
    pub fn require_session(&self) -> Result<Session, SessionError> {
        self.current().ok_or(SessionError::NoSession)
    }

    /// `Authorization: Bearer <credential>` while a session exists.
    #[must_use]
    pub fn authorization(&self) -> Option<HeaderValue> {
        self.read().authorization.clone()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Rebuild the session from the persisted credential. Called once at
    /// startup; never fails. A credential that cannot be decoded is purged.
    ///
    /// Skipped while a login or signup is in flight: that exchange owns the
    /// stored credential, and the current identity is returned unchanged.
    pub fn restore(&self) -> Option<Identity> {
        let Ok(_exchange) = self.exchange.try_lock() else {
            tracing::warn!("restore skipped: credential exchange in flight");
            return self.identity();
        };

        let stored = match self.storage.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "persisted credential unreadable; starting signed out");
                return None;
            }
        };

        let mut inner = self.write();
        match identity::decode_credential(&stored).map_err(SessionError::from).and_then(|identity| {
            let header = bearer_header(&stored)?;
            Ok((identity, header))
        }) {
            Ok((identity, header)) => {
                tracing::info!(user_id = %identity.id, role = %identity.role, "session restored");
                inner.session = Some(Session { credential: stored, identity: identity.clone() });
                inner.authorization = Some(header);
                Some(identity)
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted credential invalid; purging");
                if let Err(e) = self.storage.remove(TOKEN_KEY) {
                    tracing::warn!(error = %e, "failed to purge persisted credential");
                }
                inner.session = None;
                inner.authorization = None;
                None
            }
        }
    }

    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Authentication`] when the service rejects the credentials.
    /// - [`SessionError::Network`] when the request cannot complete.
    /// - [`SessionError::Contract`] / [`SessionError::Decode`] when the response
    ///   breaks the service contract.
    /// - [`SessionError::Storage`] when the credential cannot be persisted.
    /// - [`SessionError::Superseded`] when logout ran during the exchange.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let _exchange = self.exchange.lock().await;
        let generation = self.read().generation;

        let grant = self.auth.login(email, password).await.inspect_err(|e| {
            tracing::info!(%email, error = %e, "login failed");
        })?;
        let identity = self.establish(generation, grant)?;
        tracing::info!(user_id = %identity.id, %email, "logged in");
        Ok(identity)
    }

    /// Register an account with the given role and sign into it.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::login`].
    pub async fn signup(&self, email: &str, password: &str, role: &str) -> Result<Identity, SessionError> {
        let _exchange = self.exchange.lock().await;
        let generation = self.read().generation;

        let grant = self.auth.signup(email, password, role).await.inspect_err(|e| {
            tracing::info!(%email, %role, error = %e, "signup failed");
        })?;
        let identity = self.establish(generation, grant)?;
        tracing::info!(user_id = %identity.id, %email, %role, "signed up");
        Ok(identity)
    }

    /// Clear the session everywhere and send the user to the login page.
    /// Idempotent.
    pub fn logout(&self) {
        {
            let mut inner = self.write();
            inner.generation += 1;
            inner.session = None;
            inner.authorization = None;
            if let Err(e) = self.storage.remove(TOKEN_KEY) {
                tracing::warn!(error = %e, "failed to remove persisted credential");
            }
        }
        tracing::info!("logged out");
        self.navigator.navigate(AppPath::Login);
    }

    /// Validate a fresh grant and swap it in, unless a logout happened since
    /// `generation` was read.
    fn establish(&self, generation: u64, grant: AuthGrant) -> Result<Identity, SessionError> {
        let identity = identity::decode_credential(&grant.token)?;
        if identity != grant.user {
            tracing::error!(
                claims_id = %identity.id,
                user_id = %grant.user.id,
                "credential claims disagree with user record"
            );
            return Err(DecodeError::Mismatch.into());
        }
        let header = bearer_header(&grant.token)?;

        let mut inner = self.write();
        if inner.generation != generation {
            tracing::info!(user_id = %identity.id, "discarding exchange result after logout");
            return Err(SessionError::Superseded);
        }
        self.storage.set(TOKEN_KEY, &grant.token)?;
        inner.session = Some(Session { credential: grant.token, identity: identity.clone() });
        inner.authorization = Some(header);
        Ok(identity)
    }
}

fn bearer_header(credential: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {credential}"))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
