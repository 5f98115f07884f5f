//! Structured-output recovery.
//!
//! Models asked for JSON often wrap it in prose or a ` ```json ` fence.
//! [`parse_structured`] looks in three places, in order:
//!
//! 1. The whole response, trimmed
//! 2. Each fenced code block (` ```json ` or bare ` ``` `)
//! 3. The outermost `{ ... }` span
//!
//! The first candidate that deserializes into `T` *and* passes
//! [`StructuredOutput::is_valid`] wins. A wrong-typed field is a
//! deserialization failure, so a wrong-shaped object falls through to the
//! caller's default.

use super::entities::VerifiedFact;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;

/// JSON payloads the pipeline asks the model to produce.
pub trait StructuredOutput: DeserializeOwned {
    /// Post-deserialization shape check.
    fn is_valid(&self) -> bool {
        true
    }
}

/// Parse `text` into `T`, or `None` if no candidate validates.
pub fn parse_structured<T: StructuredOutput>(text: &str) -> Option<T> {
    candidates(text)
        .into_iter()
        .filter_map(|candidate| serde_json::from_str::<T>(candidate).ok())
        .find(StructuredOutput::is_valid)
}

/// Parse `text` into `T`, falling back to `default`.
pub fn parse_structured_or_default<T: StructuredOutput>(text: &str, default: T) -> T {
    parse_structured(text).unwrap_or(default)
}

fn candidates(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let mut out = vec![trimmed];
    out.extend(fenced_blocks(trimmed));
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
    {
        out.push(&trimmed[start..=end]);
    }
    out
}

fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        // Skip the info string (`json`, `JSON`, ...) up to the newline.
        let Some(newline) = after_fence.find('\n') else {
            break;
        };
        let body = &after_fence[newline + 1..];
        let Some(close) = body.find("```") else {
            break;
        };
        blocks.push(body[..close].trim());
        rest = &body[close + 3..];
    }
    blocks
}

/// Planning output: `{"questions": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubQuestionPlan {
    pub questions: Vec<String>,
}

impl SubQuestionPlan {
    pub const MAX_QUESTIONS: usize = 5;

    /// Plan that researches the query alone.
    pub fn single(query: &str) -> Self {
        Self {
            questions: vec![query.to_string()],
        }
    }

    /// Trimmed, non-blank questions, at most [`Self::MAX_QUESTIONS`].
    pub fn into_questions(self) -> Vec<String> {
        self.questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .take(Self::MAX_QUESTIONS)
            .collect()
    }
}

impl StructuredOutput for SubQuestionPlan {
    fn is_valid(&self) -> bool {
        self.questions.iter().any(|q| !q.trim().is_empty())
    }
}

/// One entry of the verification output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFact {
    pub claim: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    0.5
}

/// Verification output: `{"facts": [{claim, verified, sources, confidence}]}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FactReport {
    pub facts: Vec<RawFact>,
}

impl FactReport {
    /// Facts with a non-blank claim; confidence clamped into `[0, 1]`.
    pub fn into_verified_facts(self) -> Vec<VerifiedFact> {
        self.facts
            .into_iter()
            .filter(|f| !f.claim.trim().is_empty())
            .map(|f| VerifiedFact {
                claim: f.claim.trim().to_string(),
                verified: f.verified,
                supporting_domains: f
                    .sources
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<BTreeSet<_>>(),
                confidence: if f.confidence.is_nan() {
                    0.0
                } else {
                    f.confidence.clamp(0.0, 1.0)
                },
            })
            .collect()
    }
}

impl StructuredOutput for FactReport {}
