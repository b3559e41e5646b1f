//! Shared fixtures for unit tests: scripted auth service, failing storage,
//! credential builders.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::Notify;

use crate::identity::Identity;
use crate::net::auth::{AuthService, AuthServiceError};
use crate::net::types::AuthGrant;
use crate::routes::Location;
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, MemoryStore, StorageError};

pub(crate) fn identity(id: &str, email: &str, role: &str) -> Identity {
    Identity { id: id.into(), email: email.into(), role: role.into() }
}

/// HS256 JWT around `claims`, signed with a key the client never sees.
pub(crate) fn token_with(claims: &serde_json::Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(b"issuer-only-secret"),
    )
    .unwrap()
}

pub(crate) fn credential_for(who: &Identity) -> String {
    token_with(&json!({ "id": who.id, "email": who.email, "role": who.role }))
}

pub(crate) fn grant_for(who: &Identity) -> AuthGrant {
    AuthGrant { token: credential_for(who), user: who.clone() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Login { email: String, password: String },
    Signup { email: String, password: String, role: String },
}

/// Auth service answering from a script. With `hold`, every call parks
/// until `release` is notified, signalling `started` first.
#[derive(Default)]
pub(crate) struct MockAuth {
    responses: Mutex<VecDeque<Result<AuthGrant, AuthServiceError>>>,
    calls: Mutex<Vec<Call>>,
    hold: bool,
    pub started: Notify,
    pub release: Notify,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockAuth {
    pub(crate) fn new(responses: Vec<Result<AuthGrant, AuthServiceError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), ..Self::default() }
    }

    pub(crate) fn holding(responses: Vec<Result<AuthGrant, AuthServiceError>>) -> Self {
        Self { hold: true, ..Self::new(responses) }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, call: Call) -> Result<AuthGrant, AuthServiceError> {
        self.calls.lock().unwrap().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if self.hold {
            self.started.notify_one();
            self.release.notified().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AuthServiceError::Network("no scripted response".into())))
    }
}

#[async_trait::async_trait]
impl AuthService for MockAuth {
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthServiceError> {
        self.respond(Call::Login { email: email.into(), password: password.into() })
            .await
    }

    async fn signup(&self, email: &str, password: &str, role: &str) -> Result<AuthGrant, AuthServiceError> {
        self.respond(Call::Signup { email: email.into(), password: password.into(), role: role.into() })
            .await
    }
}

/// Storage whose every operation fails.
pub(crate) struct FailingStore;

fn broken() -> StorageError {
    StorageError::Io(std::io::Error::other("disk unavailable"))
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(broken())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(broken())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(broken())
    }
}

/// A store wired to a mock service, memory storage and a headless location.
pub(crate) struct Harness {
    pub auth: Arc<MockAuth>,
    pub storage: Arc<MemoryStore>,
    pub location: Arc<Location>,
    pub store: Arc<SessionStore>,
}

impl Harness {
    pub(crate) fn new(auth: MockAuth) -> Self {
        Self::with_storage(auth, Arc::new(MemoryStore::new()))
    }

    pub(crate) fn with_storage(auth: MockAuth, storage: Arc<MemoryStore>) -> Self {
        let auth = Arc::new(auth);
        let location = Arc::new(Location::new());
        let store = Arc::new(SessionStore::new(auth.clone(), storage.clone(), location.clone()));
        Self { auth, storage, location, store }
    }
}
