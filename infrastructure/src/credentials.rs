//! Environment-backed credential snapshot.

use deepdive_application::{CredentialResolver, StaticCredentials};
use std::fmt;

/// Credentials read from the process environment exactly once.
///
/// Only the names the registry references are captured. Later changes to
/// the environment are not observed.
#[derive(Clone)]
pub struct EnvCredentialResolver {
    names: Vec<String>,
    values: StaticCredentials,
}

impl EnvCredentialResolver {
    pub fn from_env<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_lookup(names, |name| std::env::var(name).ok())
    }

    /// Snapshot using an arbitrary lookup instead of `std::env`.
    pub fn from_lookup<I, S, F>(names: I, lookup: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> Option<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let values = names
            .iter()
            .filter_map(|name| lookup(name).map(|v| (name.clone(), v)))
            .collect();
        Self { names, values }
    }

    /// Names that were requested but resolved to nothing usable.
    pub fn missing(&self) -> Vec<&str> {
        self.names
            .iter()
            .filter(|n| !self.values.has(n))
            .map(String::as_str)
            .collect()
    }
}

impl CredentialResolver for EnvCredentialResolver {
    fn get(&self, key_ref: &str) -> Option<String> {
        self.values.get(key_ref)
    }
}

impl fmt::Debug for EnvCredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<&str> = self
            .names
            .iter()
            .filter(|n| self.values.has(n))
            .map(String::as_str)
            .collect();
        f.debug_struct("EnvCredentialResolver")
            .field("present", &present)
            .field("missing", &self.missing())
            .finish()
    }
}
