//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use deepdive_domain::{OrchestrationPattern, ReportType, RetryPolicy};
use std::path::PathBuf;

/// Output format for research reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The report followed by a numbered source list
    #[default]
    Markdown,
    /// The full response as JSON, including metadata
    Json,
    /// Report, sources, verified facts, and run metadata
    Full,
}

/// Report length requested from the synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportTypeArg {
    #[default]
    Comprehensive,
    Summary,
    Brief,
}

impl From<ReportTypeArg> for ReportType {
    fn from(arg: ReportTypeArg) -> Self {
        match arg {
            ReportTypeArg::Comprehensive => ReportType::Comprehensive,
            ReportTypeArg::Summary => ReportType::Summary,
            ReportTypeArg::Brief => ReportType::Brief,
        }
    }
}

/// Orchestration pattern for a single `ask`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PatternArg {
    #[default]
    Simple,
    Phased,
    Crew,
    Retry,
}

impl PatternArg {
    /// `retry` uses the configured policy rather than a built-in one.
    pub fn to_pattern(self, retry: RetryPolicy) -> OrchestrationPattern {
        match self {
            PatternArg::Simple => OrchestrationPattern::Simple,
            PatternArg::Phased => OrchestrationPattern::PhasedGraph,
            PatternArg::Crew => OrchestrationPattern::role_crew(),
            PatternArg::Retry => OrchestrationPattern::BoundedRetry(retry),
        }
    }
}

/// CLI arguments for deepdive
#[derive(Parser, Debug)]
#[command(name = "deepdive")]
#[command(author, version, about = "Multi-provider LLM router and web research assistant")]
#[command(long_about = r#"
deepdive routes LLM requests across local, commercial, and fallback models,
and runs multi-phase web research on top of that router.

A research run has five phases:
1. Planning: break the question into focused sub-questions
2. Searching: query the web for the question and each sub-question
3. Extracting: scrape the most relevant pages
4. Verifying: cross-check claims across sources
5. Synthesizing: write a cited report

Configuration files are loaded from (in priority order):
1. DEEPDIVE_* environment variables
2. --config <path>     Explicit config file
3. ./deepdive.toml     Project-level config
4. ~/.config/deepdive/config.toml   Global config

Example:
  deepdive research "How do CRDTs handle concurrent deletes?"
  deepdive research --report-type brief --prefer-local "State of RISC-V laptops"
  deepdive ask --task coding --pattern crew "Design a rate limiter in Rust"
  deepdive models
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append structured research events (JSONL) to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Research a question on the web and write a cited report
    Research(ResearchArgs),
    /// Send one prompt through the router
    Ask(AskArgs),
    /// List the model registry
    Models,
}

#[derive(Args, Debug)]
pub struct ResearchArgs {
    /// The research question
    pub query: String,

    /// Report length
    #[arg(long, value_enum, default_value = "comprehensive")]
    pub report_type: ReportTypeArg,

    /// Maximum number of sources to keep
    #[arg(long, value_name = "N")]
    pub max_sources: Option<usize>,

    /// Skip the fact verification phase
    #[arg(long)]
    pub no_verify: bool,

    /// Prefer local models over commercial ones
    #[arg(long)]
    pub prefer_local: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The prompt to send
    pub prompt: String,

    /// Task tag used for model selection (reasoning, coding, planning, ...)
    #[arg(long, value_name = "TASK")]
    pub task: Option<String>,

    /// Orchestration pattern
    #[arg(long, value_enum, default_value = "simple")]
    pub pattern: PatternArg,

    /// Route to this model id first
    #[arg(short, long, value_name = "ID")]
    pub model: Option<String>,

    /// Explicit fallback chain (can be specified multiple times)
    #[arg(long = "fallback", value_name = "ID")]
    pub fallback_chain: Vec<String>,

    /// Prefer local models over commercial ones
    #[arg(long)]
    pub prefer_local: bool,

    /// System prompt
    #[arg(long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Print the routing metadata as JSON instead of the bare answer
    #[arg(long)]
    pub json: bool,
}
