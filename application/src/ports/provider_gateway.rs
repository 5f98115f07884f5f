//! Provider gateway port
//!
//! One non-streaming chat call against one configured model. Wire format
//! selection, HTTP, and response parsing live behind this trait in the
//! infrastructure layer.

use async_trait::async_trait;
use deepdive_domain::{Completion, LlmRequest, ModelConfig};
use thiserror::Error;

/// Errors from a single provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Server-side or throttling failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Transport(_) | ProviderError::Timeout => true,
            ProviderError::InvalidResponse(_) => false,
        }
    }
}

/// Gateway for a single provider call
///
/// `credential` is the resolved value of `model.api_key_ref`, if any.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn call(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
    ) -> Result<Completion, ProviderError>;
}
