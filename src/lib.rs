//! Portal — client-side session core.
//!
//! ARCHITECTURE
//! ============
//! - [`session::SessionStore`] owns the signed-in user: credential exchange,
//!   restore from durable storage, logout.
//! - [`routes`] decides which page a navigation lands on given whether a
//!   session exists.
//! - [`net`] talks to the authentication service and builds outbound API
//!   requests carrying the session credential.
//! - [`storage`] is the durable key/value slot the credential lives in.

pub mod config;
pub mod identity;
pub mod net;
pub mod routes;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testkit;

pub use config::PortalConfig;
pub use identity::{DecodeError, Identity};
pub use routes::{Access, AppPath, Decision, Location};
pub use session::{Navigator, Session, SessionError, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, TOKEN_KEY};
