//! Provider endpoint configuration types (provider-neutral, serde-free).
//!
//! These types define where each provider lives and which credential name
//! it uses, without depending on any serialization format. The
//! infrastructure config loader converts its TOML structures into these.

/// Location and credential name for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    /// Base URL (adapter-specific path is appended by the adapter).
    pub base_url: String,
    /// Credential name (an environment variable name by default).
    /// `None` means the endpoint is unauthenticated.
    pub api_key_env: Option<String>,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key_env: None,
        }
    }

    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = Some(name.into());
        self
    }
}

/// Endpoints for every provider the built-in registry knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// Local daemon speaking the local-chat format.
    pub ollama: ProviderEndpoint,
    /// Local vLLM / TGI server speaking the OpenAI-compatible format.
    pub vllm: ProviderEndpoint,
    pub openai: ProviderEndpoint,
    pub anthropic: ProviderEndpoint,
    /// Guaranteed-available gateway; never carries a credential.
    pub gateway: ProviderEndpoint,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            ollama: ProviderEndpoint::new("http://localhost:11434"),
            vllm: ProviderEndpoint::new("http://localhost:8000/v1"),
            openai: ProviderEndpoint::new("https://api.openai.com/v1")
                .with_api_key_env("OPENAI_API_KEY"),
            anthropic: ProviderEndpoint::new("https://api.anthropic.com")
                .with_api_key_env("ANTHROPIC_API_KEY"),
            gateway: ProviderEndpoint::new("https://text.pollinations.ai/openai"),
        }
    }
}
