//! Prompt templates for the research pipeline

use crate::research::entities::{SourceInfo, VerifiedFact};
use crate::research::request::ReportType;
use crate::util::{push_within_budget, truncate_str};

/// Templates for each router-backed pipeline phase
pub struct ResearchPrompt;

impl ResearchPrompt {
    /// System prompt for the planning phase
    pub fn planning_system() -> &'static str {
        r#"You are a research planner. Break a research question into focused sub-questions
that together cover the topic. Respond with JSON only, in exactly this shape:
{"questions": ["...", "..."]}"#
    }

    /// User prompt for the planning phase
    pub fn planning_prompt(query: &str) -> String {
        format!(
            r#"Research question:

{}

Produce 3 to 5 sub-questions that a web search can answer. Each should be
self-contained and specific."#,
            query
        )
    }

    /// System prompt for fact verification
    pub fn verification_system() -> &'static str {
        r#"You are a fact checker. Extract the key factual claims from the provided sources
and check whether more than one independent source supports each claim.
Respond with JSON only, in exactly this shape:
{"facts": [{"claim": "...", "verified": true, "sources": ["domain.com"], "confidence": 0.8}]}
"confidence" is a number between 0 and 1."#
    }

    /// User prompt for fact verification.
    ///
    /// Source text is capped at `per_source_limit` bytes each and
    /// `total_limit` bytes overall.
    pub fn verification_prompt(
        query: &str,
        sources: &[SourceInfo],
        total_limit: usize,
        per_source_limit: usize,
    ) -> String {
        let mut prompt = format!("Research question: {}\n\nSources:\n", query);
        prompt.push_str(&Self::source_digest(sources, total_limit, per_source_limit));
        prompt.push_str("\nList the claims relevant to the question and their verification status.");
        prompt
    }

    /// System prompt for report synthesis
    pub fn synthesis_system(report_type: ReportType) -> String {
        let shape = match report_type {
            ReportType::Comprehensive => {
                "Write a comprehensive report with an executive summary, thematic sections \
                 with headers, and a conclusion."
            }
            ReportType::Summary => {
                "Write a concise summary report: a short overview followed by the key findings \
                 as a bullet list."
            }
            ReportType::Brief => "Write a brief answer of a few short paragraphs.",
        };
        format!(
            r#"You are a research analyst writing in Markdown.
{}
Aim for roughly {} words.
Cite sources inline as [n], where n is the number of the source in the list you are given.
Only state what the sources support; call out disagreements between sources."#,
            shape,
            report_type.word_target()
        )
    }

    /// User prompt for report synthesis
    pub fn synthesis_prompt(
        query: &str,
        sources: &[SourceInfo],
        facts: &[VerifiedFact],
        total_limit: usize,
        per_source_limit: usize,
    ) -> String {
        let mut prompt = format!("Research question: {}\n\nSources:\n", query);
        prompt.push_str(&Self::source_digest(sources, total_limit, per_source_limit));

        if !facts.is_empty() {
            prompt.push_str("\nFact check results:\n");
            for fact in facts {
                let status = if fact.verified { "verified" } else { "unverified" };
                prompt.push_str(&format!(
                    "- {} ({}, confidence {:.2})\n",
                    fact.claim, status, fact.confidence
                ));
            }
        }

        prompt.push_str("\nWrite the report now.");
        prompt
    }

    /// Numbered source listing, cut off at `total_limit` bytes.
    fn source_digest(sources: &[SourceInfo], total_limit: usize, per_source_limit: usize) -> String {
        let mut digest = String::new();
        for (i, source) in sources.iter().enumerate() {
            let body = truncate_str(&source.extracted_content, per_source_limit);
            let entry = format!(
                "\n[{}] {} ({})\nURL: {}\n{}\n",
                i + 1,
                source.title,
                source.domain,
                source.url,
                body
            );
            if !push_within_budget(&mut digest, &entry, total_limit) {
                break;
            }
        }
        digest
    }
}
