//! Session token issued by a password-grant login.

use std::fmt;

/// Opaque bearer credential. Lives only for one run and is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first `chars` characters followed by `...`.
    #[must_use]
    pub fn preview(&self, chars: usize) -> String {
        let prefix: String = self.0.chars().take(chars).collect();
        format!("{prefix}...")
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self.preview(8))
    }
}
