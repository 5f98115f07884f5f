//! Provider wire adapters and the HTTP gateway that drives them.
//!
//! Each [`ProviderKind`] maps to exactly one [`WireAdapter`]. Adapters are
//! pure: they turn an [`LlmRequest`] into a [`PreparedRequest`] and a
//! response body into a [`Completion`]. Only [`HttpProviderGateway`]
//! touches the network.

mod anthropic;
mod gateway;
mod local_chat;
mod openai_compat;

pub use gateway::HttpProviderGateway;

use deepdive_application::ProviderError;
use deepdive_domain::{Completion, LlmRequest, ModelConfig, ProviderKind};
use serde_json::Value;

/// A fully-built HTTP request, ready to POST.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub url: String,
    pub body: Value,
    pub headers: Vec<(&'static str, String)>,
}

impl PreparedRequest {
    pub fn new(url: String, body: Value) -> Self {
        Self {
            url,
            body,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: String) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// Closed set of wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireAdapter {
    OpenAiCompatible,
    Anthropic,
    LocalChat,
}

impl WireAdapter {
    pub fn for_kind(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenAiCompatible => WireAdapter::OpenAiCompatible,
            ProviderKind::Anthropic => WireAdapter::Anthropic,
            ProviderKind::LocalChat => WireAdapter::LocalChat,
        }
    }

    pub fn prepare(
        &self,
        model: &ModelConfig,
        credential: Option<&str>,
        request: &LlmRequest,
    ) -> PreparedRequest {
        match self {
            WireAdapter::OpenAiCompatible => openai_compat::build_request(model, credential, request),
            WireAdapter::Anthropic => anthropic::build_request(model, credential, request),
            WireAdapter::LocalChat => local_chat::build_request(model, credential, request),
        }
    }

    pub fn parse(&self, body: &str) -> Result<Completion, ProviderError> {
        match self {
            WireAdapter::OpenAiCompatible => openai_compat::parse_response(body),
            WireAdapter::Anthropic => anthropic::parse_response(body),
            WireAdapter::LocalChat => local_chat::parse_response(body),
        }
    }
}
