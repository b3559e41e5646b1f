//! Credential exchange against the authentication service.
//!
//! DESIGN
//! ======
//! `AuthService` is the seam the session store talks through; the HTTP
//! implementation is a thin wrapper over `reqwest` with pure parsing in
//! `parse_exchange_response` for testability. One attempt per call, no
//! retries.

use serde::Serialize;

use super::types::{AuthGrant, AuthResponse, ErrorBody, LoginRequest, SignupRequest};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// The service answered with a non-2xx status.
    #[error("credentials rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never completed (connect, timeout, body read).
    #[error("request failed: {0}")]
    Network(String),

    /// A 2xx response whose body does not carry `token` and `data.user`.
    #[error("unexpected response: {0}")]
    Contract(String),
}

impl AuthServiceError {
    /// Whether the caller may reasonably try the same exchange again.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Rejected { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange email and password for a fresh credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::Rejected`] when the service refuses the
    /// credentials and [`AuthServiceError::Network`] when the request cannot
    /// complete.
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthServiceError>;

    /// Register an account and receive its first credential.
    ///
    /// # Errors
    ///
    /// Same contract as [`AuthService::login`].
    async fn signup(&self, email: &str, password: &str, role: &str) -> Result<AuthGrant, AuthServiceError>;
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpAuthService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthService {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: crate::config::normalize_base_url(&base_url.into()) }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn exchange<B>(&self, path: &str, body: &B) -> Result<AuthGrant, AuthServiceError>
    where
        B: Serialize + Sync,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthServiceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthServiceError::Network(e.to_string()))?;

        parse_exchange_response(status, &text)
    }
}

#[async_trait::async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthServiceError> {
        self.exchange(LOGIN_PATH, &LoginRequest { email, password })
            .await
    }

    async fn signup(&self, email: &str, password: &str, role: &str) -> Result<AuthGrant, AuthServiceError> {
        self.exchange(SIGNUP_PATH, &SignupRequest { email, password, role })
            .await
    }
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_exchange_response(status: u16, body: &str) -> Result<AuthGrant, AuthServiceError> {
    if !(200..300).contains(&status) {
        return Err(AuthServiceError::Rejected { status, message: rejection_message(status, body) });
    }
    let resp: AuthResponse = serde_json::from_str(body).map_err(|e| AuthServiceError::Contract(e.to_string()))?;
    Ok(resp.into())
}

fn rejection_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_owned())
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
