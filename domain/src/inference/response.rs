//! Inference response value objects

use crate::model::config::{ModelId, ProviderKind};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    /// Build from prompt/completion counts; total is their sum.
    pub fn from_counts(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            total_tokens: self.total_tokens + rhs.total_tokens,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        *self = *self + rhs;
    }
}

/// Output of one successful provider call (or of a whole orchestration run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    /// `None` when the provider did not report usage.
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn new(content: impl Into<String>, usage: Option<Usage>) -> Self {
        Self {
            content: content.into(),
            usage,
        }
    }

    pub fn usage_or_zero(&self) -> Usage {
        self.usage.unwrap_or_default()
    }
}

/// Unified router response.
///
/// Invariants (enforced by the constructors):
/// - `fallbacks_used` never contains `model_used` and has no duplicates
/// - `success == false` implies `content` is empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub success: bool,
    pub model_used: Option<ModelId>,
    pub provider: Option<ProviderKind>,
    pub content: String,
    pub usage: Usage,
    /// Models skipped (missing credential) or failed before the one used, in trial order.
    pub fallbacks_used: Vec<ModelId>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LlmResponse {
    pub fn success(
        model: ModelId,
        provider: ProviderKind,
        completion: Completion,
        fallbacks_used: Vec<ModelId>,
        execution_time_ms: u64,
    ) -> Self {
        let fallbacks_used = dedup_excluding(fallbacks_used, Some(&model));
        Self {
            success: true,
            usage: completion.usage_or_zero(),
            content: completion.content,
            model_used: Some(model),
            provider: Some(provider),
            fallbacks_used,
            execution_time_ms,
            error: None,
        }
    }

    pub fn failure(
        fallbacks_used: Vec<ModelId>,
        error: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            success: false,
            model_used: None,
            provider: None,
            content: String::new(),
            usage: Usage::default(),
            fallbacks_used: dedup_excluding(fallbacks_used, None),
            execution_time_ms,
            error: Some(error.into()),
        }
    }

    /// Content on success, the error message otherwise.
    pub fn into_result(self) -> Result<String, String> {
        if self.success {
            Ok(self.content)
        } else {
            Err(self.error.unwrap_or_else(|| "inference failed".to_string()))
        }
    }
}

fn dedup_excluding(ids: Vec<ModelId>, exclude: Option<&ModelId>) -> Vec<ModelId> {
    let mut out: Vec<ModelId> = Vec::with_capacity(ids.len());
    for id in ids {
        if Some(&id) != exclude && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_sum() {
        let total = Usage::from_counts(10, 5) + Usage::from_counts(1, 2);
        assert_eq!(total, Usage::from_counts(11, 7));
        assert_eq!(total.total_tokens, 18);
    }

    #[test]
    fn test_success_strips_model_used_from_fallbacks() {
        let resp = LlmResponse::success(
            "b".into(),
            ProviderKind::Anthropic,
            Completion::new("ok", None),
            vec!["a".into(), "b".into(), "a".into()],
            12,
        );
        assert_eq!(resp.fallbacks_used, vec![ModelId::from("a")]);
        assert_eq!(resp.usage, Usage::default());
    }

    #[test]
    fn test_failure_has_empty_content() {
        let resp = LlmResponse::failure(vec!["a".into()], "all failed", 3);
        assert!(!resp.success);
        assert!(resp.content.is_empty());
        assert_eq!(resp.into_result(), Err("all failed".to_string()));
    }
}
