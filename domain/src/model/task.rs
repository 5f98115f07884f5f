//! Task tags used for model selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a request is for. Drives [`ModelRegistry::select_model`](super::registry::ModelRegistry::select_model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Reasoning,
    Coding,
    Planning,
    Synthesis,
    Research,
    #[default]
    General,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Reasoning => "reasoning",
            TaskKind::Coding => "coding",
            TaskKind::Planning => "planning",
            TaskKind::Synthesis => "synthesis",
            TaskKind::Research => "research",
            TaskKind::General => "general",
        }
    }

    /// Capability tag a model must carry to be the best pick for this task.
    ///
    /// `{reasoning, coding}` and the default share the reasoning model;
    /// `{synthesis, research}` share the synthesis model.
    pub fn capability(&self) -> &'static str {
        match self {
            TaskKind::Reasoning | TaskKind::Coding | TaskKind::General => "reasoning",
            TaskKind::Planning => "planning",
            TaskKind::Synthesis | TaskKind::Research => "synthesis",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "reasoning" => TaskKind::Reasoning,
            "coding" => TaskKind::Coding,
            "planning" => TaskKind::Planning,
            "synthesis" => TaskKind::Synthesis,
            "research" => TaskKind::Research,
            _ => TaskKind::General,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_task_is_general() {
        let task: TaskKind = "summarize-news".parse().unwrap();
        assert_eq!(task, TaskKind::General);
    }

    #[test]
    fn test_capability_grouping() {
        assert_eq!(TaskKind::Coding.capability(), TaskKind::Reasoning.capability());
        assert_eq!(TaskKind::Research.capability(), TaskKind::Synthesis.capability());
        assert_eq!(TaskKind::General.capability(), "reasoning");
        assert_eq!(TaskKind::Planning.capability(), "planning");
    }
}
