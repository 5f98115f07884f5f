//! Console output formatter for research reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use deepdive_domain::{
    LlmResponse, ModelRegistry, ResearchReport, ResearchResponse, SourceInfo, VerifiedFact,
};

/// Formats research responses for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Plain markdown, safe to redirect into a file.
    pub fn format_markdown(response: &ResearchResponse) -> String {
        let report = match response {
            ResearchResponse::Completed(report) => report,
            ResearchResponse::Failed { error } => return format!("Research failed: {error}\n"),
        };

        let mut output = String::new();
        output.push_str(report.report.trim_end());
        output.push_str("\n\n");

        if !report.sources.is_empty() {
            output.push_str("## Sources\n\n");
            for (i, source) in report.sources.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, Self::source_line(source)));
            }
        }

        output
    }

    /// Format as JSON
    pub fn format_json(response: &ResearchResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the complete research result
    pub fn format_full(response: &ResearchResponse) -> String {
        let report = match response {
            ResearchResponse::Completed(report) => report,
            ResearchResponse::Failed { error } => {
                return format!("{} {}\n", "Research failed:".red().bold(), error);
            }
        };

        let mut output = String::new();

        output.push_str(&Self::header("Research Report"));
        output.push('\n');

        output.push_str(&Self::section_header("Report"));
        output.push_str(&format!("\n{}\n", report.report.trim_end()));

        if !report.sources.is_empty() {
            output.push_str(&Self::section_header("Sources"));
            for (i, source) in report.sources.iter().enumerate() {
                let marker = if source.scraped {
                    "scraped".green()
                } else {
                    "snippet".yellow()
                };
                output.push_str(&format!(
                    "  {:>2}. [{:.2}] {} ({})\n",
                    i + 1,
                    source.relevance_score,
                    Self::source_line(source),
                    marker
                ));
            }
        }

        if !report.facts_verified.is_empty() {
            output.push_str(&Self::section_header("Fact Check"));
            for fact in &report.facts_verified {
                output.push_str(&Self::fact_line(fact));
            }
        }

        output.push_str(&Self::section_header("Run"));
        output.push_str(&Self::metadata_lines(report));

        output.push_str(&Self::footer());
        output
    }

    /// Format a router answer: the content, or the error on failure.
    pub fn format_answer(response: &LlmResponse) -> String {
        if response.success {
            let mut output = response.content.trim_end().to_string();
            output.push('\n');
            if let Some(model) = &response.model_used {
                let mut meta = format!("model: {model}, {} ms", response.execution_time_ms);
                if !response.fallbacks_used.is_empty() {
                    let skipped: Vec<String> =
                        response.fallbacks_used.iter().map(|m| m.to_string()).collect();
                    meta.push_str(&format!(", fell back past: {}", skipped.join(", ")));
                }
                output.push_str(&format!("\n{}\n", meta.dimmed()));
            }
            output
        } else {
            format!(
                "{} {}\n",
                "Request failed:".red().bold(),
                response.error.as_deref().unwrap_or("Unknown")
            )
        }
    }

    pub fn format_answer_json(response: &LlmResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line per model: id, tier, provider, wire name, capabilities.
    pub fn format_models(registry: &ModelRegistry) -> String {
        let fallback = &registry.fallback_model().id;
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n",
            format!(
                "{:<22} {:<11} {:<18} {:<28} {}",
                "ID", "TIER", "PROVIDER", "MODEL", "CAPABILITIES"
            )
            .bold()
        ));

        for model in registry.models() {
            let caps: Vec<&str> = model.capabilities.iter().map(String::as_str).collect();
            let mut line = format!(
                "{:<22} {:<11} {:<18} {:<28} {}",
                model.id.as_str(),
                model.tier.as_str(),
                model.provider_kind.as_str(),
                model.wire_model_name,
                caps.join(",")
            );
            if let Some(key) = &model.api_key_ref {
                line.push_str(&format!("  [{key}]"));
            }
            if &model.id == fallback {
                line.push_str("  (last resort)");
            }
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    fn source_line(source: &SourceInfo) -> String {
        let title = if source.title.trim().is_empty() {
            source.domain.as_str()
        } else {
            source.title.trim()
        };
        format!("[{}]({})", title, source.url)
    }

    fn fact_line(fact: &VerifiedFact) -> String {
        let status = if fact.verified {
            "v".green()
        } else {
            "?".yellow()
        };
        let domains: Vec<&str> = fact.supporting_domains.iter().map(String::as_str).collect();
        let mut line = format!("  {} {} ({:.0}%)", status, fact.claim, fact.confidence * 100.0);
        if !domains.is_empty() {
            line.push_str(&format!(" - {}", domains.join(", ")));
        }
        line.push('\n');
        line
    }

    fn metadata_lines(report: &ResearchReport) -> String {
        let meta = &report.metadata;
        let model = meta
            .model_used
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "  {} {}\n  {} {}\n  {} {}\n  {} {} ms\n",
            "Sources:".cyan(),
            meta.total_sources,
            "Queries:".cyan(),
            meta.queries_executed,
            "Model:".cyan(),
            model,
            "Time:".cyan(),
            meta.execution_time_ms
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_markdown(&self, response: &ResearchResponse) -> String {
        Self::format_markdown(response)
    }

    fn format_json(&self, response: &ResearchResponse) -> String {
        Self::format_json(response)
    }

    fn format_full(&self, response: &ResearchResponse) -> String {
        Self::format_full(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormat;
    use deepdive_domain::{ModelId, ProviderEndpoints, ProviderKind, ResearchMetadata};
    use std::collections::BTreeSet;

    fn source(url: &str, title: &str, scraped: bool) -> SourceInfo {
        SourceInfo {
            url: url.to_string(),
            title: title.to_string(),
            domain: "example.com".to_string(),
            extracted_content: "content".to_string(),
            relevance_score: 0.8,
            publish_date: None,
            author: None,
            scraped,
        }
    }

    fn completed() -> ResearchResponse {
        ResearchResponse::Completed(ResearchReport {
            report: "# CRDTs\n\nThey converge [1].\n".to_string(),
            sources: vec![
                source("https://example.com/a", "Intro to CRDTs", true),
                source("https://example.com/b", "", false),
            ],
            facts_verified: vec![VerifiedFact {
                claim: "CRDTs converge".to_string(),
                verified: true,
                supporting_domains: BTreeSet::from(["example.com".to_string()]),
                confidence: 0.9,
            }],
            metadata: ResearchMetadata {
                total_sources: 2,
                execution_time_ms: 1234,
                queries_executed: 3,
                model_used: Some(ModelId::new("qwen2.5-local")),
            },
        })
    }

    #[test]
    fn test_markdown_lists_sources() {
        let output = ConsoleFormatter::format_markdown(&completed());
        assert!(output.starts_with("# CRDTs"));
        assert!(output.contains("## Sources"));
        assert!(output.contains("1. [Intro to CRDTs](https://example.com/a)"));
        // Untitled sources fall back to their domain.
        assert!(output.contains("2. [example.com](https://example.com/b)"));
    }

    #[test]
    fn test_json_is_tagged() {
        let output = ConsoleFormatter::format_json(&completed());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["metadata"]["queries_executed"], 3);

        let failed = ConsoleFormatter::format_json(&ResearchResponse::failed("Synthesis failed: x"));
        let value: serde_json::Value = serde_json::from_str(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Synthesis failed: x");
    }

    #[test]
    fn test_full_includes_facts_and_metadata() {
        let output = ConsoleFormatter::format_full(&completed());
        assert!(output.contains("Research Report"));
        assert!(output.contains("Fact Check"));
        assert!(output.contains("CRDTs converge"));
        assert!(output.contains("90%"));
        assert!(output.contains("qwen2.5-local"));
        assert!(output.contains("1234"));
    }

    #[test]
    fn test_failed_response_in_every_format() {
        let failed = ResearchResponse::failed("research cancelled");
        for format in [OutputFormat::Markdown, OutputFormat::Json, OutputFormat::Full] {
            let output = ConsoleFormatter.render(&failed, format);
            assert!(output.contains("research cancelled"), "{format:?}");
        }
    }

    #[test]
    fn test_format_answer_shows_fallbacks() {
        let response = LlmResponse::success(
            ModelId::new("gateway"),
            ProviderKind::OpenAiCompatible,
            deepdive_domain::Completion::new("Hi there", None),
            vec![ModelId::new("gpt-4o")],
            42,
        );
        let output = ConsoleFormatter::format_answer(&response);
        assert!(output.starts_with("Hi there"));
        assert!(output.contains("gpt-4o"));

        let failed = LlmResponse::failure(vec![], "all models failed: x", 5);
        assert!(ConsoleFormatter::format_answer(&failed).contains("all models failed"));
    }

    #[test]
    fn test_format_models_marks_fallback() {
        let registry = ModelRegistry::builtin(&ProviderEndpoints::default());
        let output = ConsoleFormatter::format_models(&registry);
        assert_eq!(output.lines().count(), registry.models().len() + 1);
        assert_eq!(output.matches("(last resort)").count(), 1);
    }
}
