//! Router parameters: timeouts and request defaults.

use deepdive_domain::RetryPolicy;
use deepdive_domain::inference::request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use std::time::Duration;

/// Inference router parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    /// Prefer local models even when the request does not ask for it.
    pub prefer_local: bool,
    /// Upper bound on a single provider call.
    pub call_timeout: Duration,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
    /// Policy used when a caller asks for Bounded-Retry without one.
    pub retry: RetryPolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefer_local: false,
            call_timeout: Duration::from_secs(120),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_temperature: DEFAULT_TEMPERATURE,
            retry: RetryPolicy::default(),
        }
    }
}

impl RouterConfig {
    // ==================== Builder Methods ====================

    pub fn with_prefer_local(mut self, prefer_local: bool) -> Self {
        self.prefer_local = prefer_local;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = temperature;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
