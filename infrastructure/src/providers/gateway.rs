//! HTTP gateway: POSTs a [`PreparedRequest`] and parses the reply.

use super::{PreparedRequest, WireAdapter};
use async_trait::async_trait;
use deepdive_application::{ProviderError, ProviderGateway};
use deepdive_domain::{Completion, LlmRequest, ModelConfig};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Response bodies longer than this are cut in error messages.
const MAX_ERROR_BODY: usize = 512;

/// [`ProviderGateway`] over a shared `reqwest::Client`.
///
/// The client is connection-pooled and safe to share across concurrent
/// requests. Per-call deadlines are enforced by the router, not here.
#[derive(Clone)]
pub struct HttpProviderGateway {
    client: reqwest::Client,
}

impl HttpProviderGateway {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build with a client-level request timeout as a backstop.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    async fn send(&self, prepared: PreparedRequest) -> Result<String, ProviderError> {
        let mut builder = self.client.post(&prepared.url).json(&prepared.body);
        for (name, value) in &prepared.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: clip(&body),
            });
        }
        Ok(body)
    }
}

impl Default for HttpProviderGateway {
    fn default() -> Self {
        Self::new()
    }
}

// The client may carry default headers; never print it.
impl fmt::Debug for HttpProviderGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProviderGateway").finish_non_exhaustive()
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn call(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
    ) -> Result<Completion, ProviderError> {
        let adapter = WireAdapter::for_kind(model.provider_kind);
        let prepared = adapter.prepare(model, credential, request);
        debug!(
            model = %model.id,
            provider = %model.provider_kind,
            url = %prepared.url,
            "Calling provider"
        );

        let body = self.send(prepared).await.inspect_err(|e| {
            warn!(
                model = %model.id,
                transient = e.is_transient(),
                error = %e,
                "Provider call failed"
            );
        })?;
        adapter.parse(&body)
    }
}

fn map_send_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(error.to_string())
    }
}

fn clip(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
