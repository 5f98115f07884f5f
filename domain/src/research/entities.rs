//! Research entities

use crate::model::config::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Pipeline state machine:
/// `Created → Planning → Searching → Extracting → Verifying? → Synthesizing → Completed | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchState {
    Created,
    Planning,
    Searching,
    Extracting,
    Verifying,
    Synthesizing,
    Completed,
    Failed,
}

impl ResearchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchState::Created => "created",
            ResearchState::Planning => "planning",
            ResearchState::Searching => "searching",
            ResearchState::Extracting => "extracting",
            ResearchState::Verifying => "verifying",
            ResearchState::Synthesizing => "synthesizing",
            ResearchState::Completed => "completed",
            ResearchState::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ResearchState::Created => "Created",
            ResearchState::Planning => "Planning",
            ResearchState::Searching => "Searching",
            ResearchState::Extracting => "Extracting",
            ResearchState::Verifying => "Verifying",
            ResearchState::Synthesizing => "Synthesizing",
            ResearchState::Completed => "Completed",
            ResearchState::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResearchState::Completed | ResearchState::Failed)
    }

    /// Whether `next` is a legal successor. `Failed` is reachable from
    /// any non-terminal state; `Verifying` may be skipped.
    pub fn can_transition_to(&self, next: ResearchState) -> bool {
        use ResearchState::*;
        match (self, next) {
            (s, Failed) => !s.is_terminal(),
            (Created, Planning)
            | (Planning, Searching)
            | (Searching, Extracting)
            | (Extracting, Verifying)
            | (Extracting, Synthesizing)
            | (Verifying, Synthesizing)
            | (Synthesizing, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ResearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A gathered source. `url` is the uniqueness key within a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub url: String,
    pub title: String,
    pub domain: String,
    /// Scraped page text, or the search snippet when scraping failed or was skipped.
    pub extracted_content: String,
    /// In `[0, 1]`.
    pub relevance_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Whether `extracted_content` came from a successful scrape.
    pub scraped: bool,
}

/// A fact checked against the gathered sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedFact {
    pub claim: String,
    pub verified: bool,
    pub supporting_domains: BTreeSet<String>,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// One research run. Owned and mutated only by the pipeline task running it.
#[derive(Debug, Clone)]
pub struct ResearchTask {
    pub query: String,
    pub sub_questions: Vec<String>,
    pub sources: Vec<SourceInfo>,
    pub verified_facts: Vec<VerifiedFact>,
    pub report: Option<String>,
    pub queries_executed: usize,
    /// Per-query search and per-source scrape failures, for metadata.
    pub partial_failures: Vec<String>,
    /// Model that produced the report.
    pub model_used: Option<ModelId>,
    pub error: Option<String>,
    state: ResearchState,
}

impl ResearchTask {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sub_questions: Vec::new(),
            sources: Vec::new(),
            verified_facts: Vec::new(),
            report: None,
            queries_executed: 0,
            partial_failures: Vec::new(),
            model_used: None,
            error: None,
            state: ResearchState::Created,
        }
    }

    pub fn state(&self) -> ResearchState {
        self.state
    }

    /// Advance the state machine. Illegal transitions are ignored and
    /// reported as `false`.
    pub fn transition(&mut self, next: ResearchState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.report = None;
        self.transition(ResearchState::Failed);
    }

    pub fn complete(&mut self, report: String, model_used: Option<ModelId>) {
        self.report = Some(report);
        self.model_used = model_used;
        self.transition(ResearchState::Completed);
    }

    /// `[query, ...sub_questions]`, skipping sub-questions identical to the query.
    pub fn search_queries(&self) -> Vec<String> {
        let mut queries = vec![self.query.clone()];
        for q in &self.sub_questions {
            if !queries.contains(q) {
                queries.push(q.clone());
            }
        }
        queries
    }

    pub fn record_partial_failure(&mut self, note: impl Into<String>) {
        self.partial_failures.push(note.into());
    }
}
