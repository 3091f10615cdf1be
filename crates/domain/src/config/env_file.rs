//! Flat `KEY=VALUE` configuration source.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key/value pairs parsed from an env-style text file.
///
/// Parsing never fails: lines without `=`, or with an empty key or value
/// after trimming, are ignored. The same rule applies to values inserted
/// directly, so an override can never blank out a configured key. A key defined more than once keeps the
/// value from its last line.
///
/// # Example
///
/// ```
/// use authprobe_domain::config::EnvFile;
///
/// let env = EnvFile::parse("ANON_KEY=abc123\nANON_KEY = def456\n");
/// assert_eq!(env.get("ANON_KEY"), Some("def456"));
/// assert_eq!(env.get("MISSING"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvFile {
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses env-style content.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut env = Self::new();
        for (key, value) in content.lines().filter_map(|line| line.split_once('=')) {
            env.insert(key, value);
        }
        env
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Inserts or replaces a value, trimmed.
    ///
    /// Returns false and leaves the mapping untouched if the key or the
    /// value is blank.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> bool {
        let (key, value) = (key.as_ref().trim(), value.as_ref().trim());
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.values.insert(key.to_string(), value.to_string());
        true
    }

    /// Applies `overrides` on top of these values; overriding keys win.
    pub fn merge(&mut self, overrides: &Self) {
        for (key, value) in &overrides.values {
            self.insert(key, value);
        }
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no keys were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
