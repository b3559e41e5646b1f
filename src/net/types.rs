//! Wire types for the authentication service.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /api/auth/signup` body.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

/// Success body shared by login and signup.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub data: AuthResponseData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponseData {
    pub user: Identity,
}

/// Error body the service may attach to a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Fresh credential plus the user record it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    pub user: Identity,
}

impl From<AuthResponse> for AuthGrant {
    fn from(resp: AuthResponse) -> Self {
        Self { token: resp.token, user: resp.data.user }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
