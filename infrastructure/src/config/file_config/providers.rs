//! Provider configuration from TOML (`[providers]` section)

use deepdive_domain::{ProviderEndpoint, ProviderEndpoints};
use serde::{Deserialize, Serialize};

/// One provider's location and credential name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProviderEndpoint {
    /// Base URL for the provider API.
    pub base_url: String,
    /// Environment variable name for the API key. Unset means unauthenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl From<ProviderEndpoint> for FileProviderEndpoint {
    fn from(endpoint: ProviderEndpoint) -> Self {
        Self {
            base_url: endpoint.base_url,
            api_key_env: endpoint.api_key_env,
        }
    }
}

impl FileProviderEndpoint {
    fn to_endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key_env: self.api_key_env.clone().filter(|v| !v.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub ollama: FileProviderEndpoint,
    pub vllm: FileProviderEndpoint,
    pub openai: FileProviderEndpoint,
    pub anthropic: FileProviderEndpoint,
    /// Guaranteed-available gateway used by the fallback model.
    pub gateway: FileProviderEndpoint,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        let defaults = ProviderEndpoints::default();
        Self {
            ollama: defaults.ollama.into(),
            vllm: defaults.vllm.into(),
            openai: defaults.openai.into(),
            anthropic: defaults.anthropic.into(),
            gateway: defaults.gateway.into(),
        }
    }
}

impl FileProvidersConfig {
    pub fn to_endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            ollama: self.ollama.to_endpoint(),
            vllm: self.vllm.to_endpoint(),
            openai: self.openai.to_endpoint(),
            anthropic: self.anthropic.to_endpoint(),
            gateway: self.gateway.to_endpoint(),
        }
    }
}
