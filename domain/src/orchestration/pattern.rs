//! Orchestration patterns layered over a single provider call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Control-flow template applied to one routed model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrchestrationPattern {
    /// One call, result returned unmodified.
    #[default]
    Simple,
    /// Five fixed phases, each fed the outputs of the previous ones.
    PhasedGraph,
    /// Ordered agents, each fed the outputs of the previous agents.
    RoleCrew {
        #[serde(default = "CrewAgent::default_crew")]
        agents: Vec<CrewAgent>,
    },
    /// One call retried with exponential backoff.
    BoundedRetry(RetryPolicy),
}

impl OrchestrationPattern {
    pub fn role_crew() -> Self {
        OrchestrationPattern::RoleCrew {
            agents: CrewAgent::default_crew(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationPattern::Simple => "simple",
            OrchestrationPattern::PhasedGraph => "phased_graph",
            OrchestrationPattern::RoleCrew { .. } => "role_crew",
            OrchestrationPattern::BoundedRetry(_) => "bounded_retry",
        }
    }
}

impl fmt::Display for OrchestrationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrchestrationPattern {
    type Err = String;

    /// Parses the short names used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(OrchestrationPattern::Simple),
            "phased" | "phased_graph" | "graph" => Ok(OrchestrationPattern::PhasedGraph),
            "crew" | "role_crew" => Ok(OrchestrationPattern::role_crew()),
            "retry" | "bounded_retry" => Ok(OrchestrationPattern::BoundedRetry(
                RetryPolicy::default(),
            )),
            other => Err(format!("unknown orchestration pattern: {other}")),
        }
    }
}

/// Retry budget for [`OrchestrationPattern::BoundedRetry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
        }
    }

    /// Backoff before the attempt following `attempt` (1-based):
    /// `base_delay_ms * 2^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        Duration::from_millis(self.base_delay_ms.saturating_mul(1u64 << exp))
    }
}

/// One agent in a Role-Crew run. A prompt scope, not a separate process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewAgent {
    pub name: String,
    pub instructions: String,
}

impl CrewAgent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
        }
    }

    /// Researcher → Analyst → Writer.
    pub fn default_crew() -> Vec<CrewAgent> {
        vec![
            CrewAgent::new(
                "Researcher",
                "Gather the relevant facts, definitions, and evidence for the request. \
                 List what is known and what is uncertain.",
            ),
            CrewAgent::new(
                "Analyst",
                "Examine the researcher's findings. Identify patterns, trade-offs, \
                 contradictions, and the strongest conclusions they support.",
            ),
            CrewAgent::new(
                "Writer",
                "Write a clear, well-structured answer for the user based on the \
                 research and analysis so far.",
            ),
        ]
    }
}

/// Phases of a Phased-Graph run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphPhase {
    Analyze,
    Plan,
    Execute,
    Observe,
    Synthesize,
}

impl GraphPhase {
    pub const ALL: [GraphPhase; 5] = [
        GraphPhase::Analyze,
        GraphPhase::Plan,
        GraphPhase::Execute,
        GraphPhase::Observe,
        GraphPhase::Synthesize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphPhase::Analyze => "analyze",
            GraphPhase::Plan => "plan",
            GraphPhase::Execute => "execute",
            GraphPhase::Observe => "observe",
            GraphPhase::Synthesize => "synthesize",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GraphPhase::Analyze => "Analyze",
            GraphPhase::Plan => "Plan",
            GraphPhase::Execute => "Execute",
            GraphPhase::Observe => "Observe",
            GraphPhase::Synthesize => "Synthesize",
        }
    }
}

impl fmt::Display for GraphPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
