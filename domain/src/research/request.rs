//! Pipeline entry and exit contract

use super::entities::{SourceInfo, VerifiedFact};
use crate::model::config::ModelId;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Shape of the synthesized report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Comprehensive,
    Summary,
    Brief,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Comprehensive => "comprehensive",
            ReportType::Summary => "summary",
            ReportType::Brief => "brief",
        }
    }

    /// Approximate length target handed to the synthesis prompt.
    pub fn word_target(&self) -> usize {
        match self {
            ReportType::Comprehensive => 1500,
            ReportType::Summary => 500,
            ReportType::Brief => 200,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comprehensive" | "full" => Ok(ReportType::Comprehensive),
            "summary" => Ok(ReportType::Summary),
            "brief" => Ok(ReportType::Brief),
            other => Err(format!(
                "unknown report type '{other}' (expected comprehensive, summary or brief)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    #[serde(default)]
    pub report_type: ReportType,
    /// Source cap for this run; `None` uses the pipeline's configured cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sources: Option<usize>,
    #[serde(default = "default_true")]
    pub include_fact_verification: bool,
    #[serde(default)]
    pub prefer_local: bool,
}

fn default_true() -> bool {
    true
}

impl ResearchRequest {
    pub const DEFAULT_MAX_SOURCES: usize = 10;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            report_type: ReportType::default(),
            max_sources: None,
            include_fact_verification: true,
            prefer_local: false,
        }
    }

    pub fn with_report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = Some(max_sources);
        self
    }

    pub fn with_fact_verification(mut self, enabled: bool) -> Self {
        self.include_fact_verification = enabled;
        self
    }

    pub fn with_prefer_local(mut self, prefer_local: bool) -> Self {
        self.prefer_local = prefer_local;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchMetadata {
    pub total_sources: usize,
    pub execution_time_ms: u64,
    pub queries_executed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<ModelId>,
}

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub report: String,
    pub sources: Vec<SourceInfo>,
    pub facts_verified: Vec<VerifiedFact>,
    pub metadata: ResearchMetadata,
}

/// Either a full report or a structured error; never a partial report.
///
/// Serializes flat with a `success` tag:
/// `{"success": true, "report": ..., "metadata": ...}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResearchResponse {
    Completed(ResearchReport),
    Failed { error: String },
}

impl ResearchResponse {
    pub fn failed(error: impl Into<String>) -> Self {
        ResearchResponse::Failed {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResearchResponse::Completed(_))
    }

    pub fn report(&self) -> Option<&ResearchReport> {
        match self {
            ResearchResponse::Completed(report) => Some(report),
            ResearchResponse::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResearchResponse::Completed(_) => None,
            ResearchResponse::Failed { error } => Some(error),
        }
    }
}

#[derive(Serialize)]
struct TaggedResponse<'a> {
    success: bool,
    #[serde(flatten)]
    report: Option<&'a ResearchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for ResearchResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedResponse {
            success: self.is_success(),
            report: self.report(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}
