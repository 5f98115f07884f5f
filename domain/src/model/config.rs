//! Model configuration value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::error::DomainError;

/// Identifier of a registry entry (e.g. `"gpt-4o"`, `"llama3.1-local"`).
///
/// This is the routing key, not the name sent on the wire; see
/// [`ModelConfig::wire_model_name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Wire format spoken by a model's endpoint.
///
/// Each variant maps to exactly one adapter in the infrastructure layer,
/// so routing never branches on provider-specific flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `/chat/completions`: commercial GPT-style APIs, vLLM, TGI, and the
    /// fallback gateway.
    OpenAiCompatible,
    /// `/v1/messages` with a top-level `system` field.
    Anthropic,
    /// A local daemon's own `/api/chat` shape (`options.num_predict`).
    LocalChat,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAiCompatible => "openai_compatible",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::LocalChat => "local_chat",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai_compatible" | "openai-compatible" | "openai" => {
                Ok(ProviderKind::OpenAiCompatible)
            }
            "anthropic" => Ok(ProviderKind::Anthropic),
            "local_chat" | "local-chat" | "ollama" => Ok(ProviderKind::LocalChat),
            other => Err(DomainError::UnknownProviderKind(other.to_string())),
        }
    }
}

/// Deployment tier of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Self-hosted inference (Ollama, vLLM, TGI).
    Local,
    /// Paid API requiring a credential.
    Commercial,
    /// Always-available last resort; never requires a credential.
    Fallback,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Local => "local",
            ModelTier::Commercial => "commercial",
            ModelTier::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ModelTier::Local),
            "commercial" => Ok(ModelTier::Commercial),
            "fallback" => Ok(ModelTier::Fallback),
            other => Err(DomainError::InvalidConfig(format!("unknown tier: {other}"))),
        }
    }
}

/// A single registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: ModelId,
    pub provider_kind: ProviderKind,
    /// Base URL; the adapter appends its own path.
    pub endpoint: String,
    /// Model name sent in the request body.
    pub wire_model_name: String,
    /// Upper bound for `max_tokens` on this model.
    pub max_tokens: u32,
    pub capabilities: BTreeSet<String>,
    pub tier: ModelTier,
    /// Name of the credential to resolve; `None` for unauthenticated runtimes.
    pub api_key_ref: Option<String>,
}

impl ModelConfig {
    pub fn new(
        id: impl Into<ModelId>,
        provider_kind: ProviderKind,
        endpoint: impl Into<String>,
        wire_model_name: impl Into<String>,
        tier: ModelTier,
    ) -> Self {
        Self {
            id: id.into(),
            provider_kind,
            endpoint: endpoint.into(),
            wire_model_name: wire_model_name.into(),
            max_tokens: 4096,
            capabilities: BTreeSet::new(),
            tier,
            api_key_ref: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_capabilities<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(caps.into_iter().map(Into::into));
        self
    }

    pub fn with_api_key_ref(mut self, key_ref: impl Into<String>) -> Self {
        self.api_key_ref = Some(key_ref.into());
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn requires_credential(&self) -> bool {
        self.api_key_ref.is_some()
    }

    /// Clamp a requested token budget to this model's limit.
    pub fn effective_max_tokens(&self, requested: u32) -> u32 {
        requested.min(self.max_tokens)
    }
}
