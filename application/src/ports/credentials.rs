//! Credential resolution port

use std::collections::HashMap;

/// Resolves credential names (`api_key_ref`) to secret values.
///
/// Implementations must not perform I/O per lookup; the environment is
/// snapshotted once at startup.
pub trait CredentialResolver: Send + Sync {
    fn get(&self, key_ref: &str) -> Option<String>;

    fn has(&self, key_ref: &str) -> bool {
        self.get(key_ref).is_some()
    }
}

/// Fixed in-memory credentials.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key_ref: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key_ref.into(), value.into());
        self
    }
}

impl FromIterator<(String, String)> for StaticCredentials {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl CredentialResolver for StaticCredentials {
    fn get(&self, key_ref: &str) -> Option<String> {
        self.values
            .get(key_ref)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}
