//! Outbound API client that carries the session credential.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every request is built through [`ApiClient::request`], which reads the
//! bearer header from the session store at call time. There is no global
//! default header to fall out of sync with the session.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};

use crate::session::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self { http, base_url: crate::config::normalize_base_url(&base_url.into()), session }
    }

    /// Start a request to `path` on the API host, authorized when a session
    /// exists at the moment of the call.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        match self.session.authorization() {
            Some(header) => builder.header(AUTHORIZATION, header),
            None => builder,
        }
    }

    /// `GET` a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status, or a body
    /// that is not JSON.
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
