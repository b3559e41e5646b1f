//! Identity claims carried inside a bearer credential.
//!
//! SYSTEM CONTEXT
//! ==============
//! The authentication service issues JWTs whose payload embeds `id`, `email`
//! and `role`. The client never verifies signatures (it holds no key); it
//! only reads the payload so a persisted credential can rebuild the session
//! without a network round trip.

use std::sync::LazyLock;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer, Serialize};

/// Decoded identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user identifier. Numeric ids are kept in their decimal form.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub email: String,
    /// Authorization tier. Opaque to this crate.
    pub role: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("credential is not a well-formed JWT")]
    Malformed,
    #[error("credential expired")]
    Expired,
    #[error("credential claims unreadable: {0}")]
    Claims(jsonwebtoken::errors::Error),
    #[error("credential claims do not match the returned user record")]
    Mismatch,
}

impl From<jsonwebtoken::errors::Error> for DecodeError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => Self::Malformed,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Claims(err),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Payload-only validation: signature skipped, `exp` enforced when present
/// (integer or fractional NumericDate), no claim mandatory, no leeway.
static VALIDATION: LazyLock<Validation> = LazyLock::new(|| {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation
});

/// Decode the identity embedded in `credential`, rejecting expired ones.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the credential is not a JWT, its payload does
/// not carry `id`, `email` and `role`, or its `exp` claim lies in the past.
pub fn decode_credential(credential: &str) -> Result<Identity, DecodeError> {
    let data = jsonwebtoken::decode::<Identity>(credential.trim(), &DecodingKey::from_secret(&[]), &VALIDATION)?;
    Ok(data.claims)
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
