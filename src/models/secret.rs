//! Opaque credentials.

use serde::{Deserialize, Serialize};

/// A credential that must never end up in logs.
///
/// `Debug` and `Display` print a redaction; use [`Secret::expose`] at the
/// single place the raw value is put on the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// Raw credential value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// TMDB credential, resolved once per run and passed down to every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(Secret);

impl ApiKey {
    /// Resolve a configured value, rejecting blanks.
    pub fn resolve(value: Option<&Secret>) -> Option<Self> {
        value.filter(|s| !s.is_empty()).cloned().map(Self)
    }

    pub fn expose(&self) -> &str {
        self.0.expose()
    }

    /// Bearer tokens (API v4) are JWTs; their base64 header starts with "eyJ".
    pub fn is_bearer(&self) -> bool {
        self.expose().starts_with("eyJ")
    }
}
