//! Route guard: which page is reachable for the current session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation is resolved through [`evaluate`], a pure function of the
//! requested path and whether a session exists. Protected pages bounce
//! signed-out users to `/login`; public-only pages (login, signup, password
//! recovery, email verification) bounce signed-in users to `/`. Paths outside
//! the table are denied.

use std::sync::{Mutex, PoisonError};

use crate::session::{Navigator, SessionStore};

/// Every page the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppPath {
    Home,
    Login,
    Signup,
    ForgotPassword,
    ResetPassword,
    VerifyEmail,
}

/// Who may see a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Requires a session.
    Protected,
    /// Requires the absence of a session.
    PublicOnly,
    /// Reachable either way.
    Public,
}

/// Outcome of one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render(AppPath),
    Redirect(AppPath),
    NotFound,
}

impl AppPath {
    pub const ALL: [Self; 6] =
        [Self::Home, Self::Login, Self::Signup, Self::ForgotPassword, Self::ResetPassword, Self::VerifyEmail];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::ForgotPassword => "/forgot-password",
            Self::ResetPassword => "/reset-password",
            Self::VerifyEmail => "/verify-email",
        }
    }

    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Self::Home => Access::Protected,
            Self::Login | Self::Signup | Self::ForgotPassword | Self::ResetPassword | Self::VerifyEmail => {
                Access::PublicOnly
            }
        }
    }

    /// Look up a requested location. Matching ignores ASCII case; query
    /// strings, fragments and a trailing slash are dropped.
    #[must_use]
    pub fn parse(requested: &str) -> Option<Self> {
        let path = normalize(requested);
        Self::ALL.into_iter().find(|p| p.as_str().eq_ignore_ascii_case(path))
    }
}

impl std::fmt::Display for AppPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(requested: &str) -> &str {
    let end = requested.find(['?', '#']).unwrap_or(requested.len());
    let path = requested[..end].trim();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Decide what a navigation to `page` shows.
#[must_use]
pub fn decide(page: AppPath, authenticated: bool) -> Decision {
    match (page.access(), authenticated) {
        (Access::Protected, false) => Decision::Redirect(AppPath::Login),
        (Access::PublicOnly, true) => Decision::Redirect(AppPath::Home),
        _ => Decision::Render(page),
    }
}

/// Decide what a navigation to the raw `requested` location shows.
#[must_use]
pub fn evaluate(requested: &str, authenticated: bool) -> Decision {
    AppPath::parse(requested).map_or(Decision::NotFound, |page| decide(page, authenticated))
}

/// [`evaluate`] against the live session.
#[must_use]
pub fn guard(session: &SessionStore, requested: &str) -> Decision {
    let authenticated = session.is_authenticated();
    let decision = evaluate(requested, authenticated);
    tracing::debug!(%requested, authenticated, ?decision, "route evaluated");
    decision
}

// =============================================================================
// LOCATION
// =============================================================================

/// Current location of a headless client, with the trail that led there.
#[derive(Debug, Default)]
pub struct Location {
    trail: Mutex<Vec<AppPath>>,
}

impl Location {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<AppPath> {
        self.trail.lock().unwrap_or_else(PoisonError::into_inner).last().copied()
    }

    #[must_use]
    pub fn trail(&self) -> Vec<AppPath> {
        self.trail.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Navigate to `requested`, following a guard redirect. Returns the
    /// decision for the requested path; a `NotFound` leaves the location as is.
    pub fn open(&self, session: &SessionStore, requested: &str) -> Decision {
        let decision = guard(session, requested);
        match decision {
            Decision::Render(page) | Decision::Redirect(page) => self.navigate(page),
            Decision::NotFound => {}
        }
        decision
    }
}

impl Navigator for Location {
    fn navigate(&self, to: AppPath) {
        tracing::debug!(%to, "navigate");
        self.trail.lock().unwrap_or_else(PoisonError::into_inner).push(to);
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
