//! Extra registry entries from TOML (`[[models]]` array)

use deepdive_domain::{
    ConfigIssue, ConfigIssueCode, ModelConfig, ModelTier, ProviderKind,
};
use serde::{Deserialize, Serialize};

/// One `[[models]]` entry.
///
/// ```toml
/// [[models]]
/// id = "mistral-local"
/// provider = "local_chat"
/// endpoint = "http://localhost:11434"
/// model = "mistral"
/// tier = "local"
/// capabilities = ["reasoning", "synthesis"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileModelEntry {
    pub id: String,
    /// `openai_compatible` (`openai`), `anthropic`, or `local_chat` (`ollama`).
    pub provider: String,
    pub endpoint: String,
    /// Name sent on the wire; defaults to `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// `local`, `commercial`, or `fallback`. Defaults to `local`.
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_tier() -> String {
    "local".to_string()
}

impl FileModelEntry {
    /// Convert to a registry entry, or report why it cannot be used.
    pub fn to_model_config(&self) -> Result<ModelConfig, ConfigIssue> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(ConfigIssue::error(
                ConfigIssueCode::EmptyModelId,
                "[[models]] entry has an empty id",
            ));
        }

        let kind: ProviderKind = self.provider.parse().map_err(|_| {
            ConfigIssue::error(
                ConfigIssueCode::UnknownProviderKind {
                    model: id.to_string(),
                    value: self.provider.clone(),
                },
                format!(
                    "model {}: unknown provider '{}' (expected openai_compatible, anthropic, or local_chat)",
                    id, self.provider
                ),
            )
        })?;

        let tier: ModelTier = self.tier.parse().map_err(|_| {
            ConfigIssue::error(
                ConfigIssueCode::UnknownTier {
                    model: id.to_string(),
                    value: self.tier.clone(),
                },
                format!(
                    "model {}: unknown tier '{}' (expected local, commercial, or fallback)",
                    id, self.tier
                ),
            )
        })?;

        let wire = self.model.as_deref().unwrap_or(id);
        let mut config = ModelConfig::new(
            id,
            kind,
            self.endpoint.trim_end_matches('/'),
            wire,
            tier,
        )
        .with_capabilities(self.capabilities.iter().map(|c| c.trim().to_lowercase()));
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(key) = self.api_key_env.as_deref().filter(|k| !k.trim().is_empty()) {
            config = config.with_api_key_ref(key);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(provider: &str, tier: &str) -> FileModelEntry {
        FileModelEntry {
            id: "mistral-local".into(),
            provider: provider.into(),
            endpoint: "http://localhost:11434/".into(),
            model: None,
            tier: tier.into(),
            max_tokens: Some(2048),
            capabilities: vec!["Reasoning".into()],
            api_key_env: None,
        }
    }

    #[test]
    fn test_converts_valid_entry() {
        let config = entry("ollama", "local").to_model_config().unwrap();
        assert_eq!(config.provider_kind, ProviderKind::LocalChat);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.wire_model_name, "mistral-local");
        assert_eq!(config.max_tokens, 2048);
        assert!(config.has_capability("reasoning"));
        assert!(!config.requires_credential());
    }

    #[test]
    fn test_unknown_provider_is_reported() {
        let issue = entry("carrier-pigeon", "local").to_model_config().unwrap_err();
        assert!(matches!(
            issue.code,
            ConfigIssueCode::UnknownProviderKind { ref value, .. } if value == "carrier-pigeon"
        ));
        assert!(issue.is_error());
    }

    #[test]
    fn test_unknown_tier_is_reported() {
        let issue = entry("anthropic", "premium").to_model_config().unwrap_err();
        assert!(matches!(issue.code, ConfigIssueCode::UnknownTier { .. }));
    }
}
