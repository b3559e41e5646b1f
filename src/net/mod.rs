//! HTTP boundary: credential exchange and authorized API calls.

pub mod api;
pub mod auth;
pub mod types;

use crate::config::Timeouts;

/// Build the single HTTP client shared by the auth service and API client.
///
/// # Errors
///
/// Returns the underlying `reqwest` error if the TLS backend fails to
/// initialize.
pub fn build_http_client(timeouts: Timeouts) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeouts.request())
        .connect_timeout(timeouts.connect())
        .build()
}
