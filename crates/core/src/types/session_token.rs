//! Anonymous cart session identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a string is not a valid session token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid session token")]
pub struct SessionTokenError;

/// Identifies a guest's cart before they sign in.
///
/// Generated by the storefront the first time a guest changes their cart and
/// forwarded to the backend in the `X-Session-Id` header. Always a UUID v4
/// in hyphenated lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Parse a token received from a session store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionTokenError`] if the value is not a UUID.
    pub fn parse(s: &str) -> Result<Self, SessionTokenError> {
        Uuid::parse_str(s.trim())
            .map(|uuid| Self(uuid.hyphenated().to_string()))
            .map_err(|_| SessionTokenError)
    }

    /// Token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionToken {
    type Error = SessionTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}
