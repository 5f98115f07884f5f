//! Router configuration from TOML (`[router]` and `[retry]` sections)

use deepdive_domain::RetryPolicy;
use deepdive_domain::inference::request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRouterConfig {
    /// Prefer local models for every request.
    pub prefer_local: bool,
    /// Per provider call timeout in seconds.
    pub call_timeout_secs: u64,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
}

impl Default for FileRouterConfig {
    fn default() -> Self {
        Self {
            prefer_local: false,
            call_timeout_secs: 120,
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Bounded-Retry defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Total attempts, including the first.
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            base_delay_ms: policy.base_delay_ms,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.base_delay_ms)
    }
}
