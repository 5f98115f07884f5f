//! Prompt domain
//!
//! Templates for the research pipeline phases and for the multi-step
//! orchestration patterns.

mod orchestration;
mod template;

pub use orchestration::OrchestrationPrompt;
pub use template::ResearchPrompt;
