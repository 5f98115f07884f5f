//! Prompt assembly for the multi-step orchestration patterns.
//!
//! Every step sees the caller's original conversation. Step-specific
//! instructions go into the system message; outputs of earlier steps are
//! appended as a final user message.

use crate::inference::message::ChatMessage;
use crate::orchestration::pattern::{CrewAgent, GraphPhase};

/// Templates for Phased-Graph and Role-Crew steps
pub struct OrchestrationPrompt;

impl OrchestrationPrompt {
    /// System prompt naming a graph phase
    pub fn phase_system(phase: GraphPhase) -> String {
        let task = match phase {
            GraphPhase::Analyze => {
                "Analyze the request: restate the goal, identify constraints, and list the \
                 open questions."
            }
            GraphPhase::Plan => "Produce a short, ordered plan for answering the request.",
            GraphPhase::Execute => {
                "Carry out the plan step by step and produce the substantive answer material."
            }
            GraphPhase::Observe => {
                "Review the work so far. Point out errors, gaps, and unsupported claims."
            }
            GraphPhase::Synthesize => {
                "Write the final answer for the user, incorporating the review. Output only \
                 the answer."
            }
        };
        format!("You are in the {} phase of a structured reasoning process.\n{}", phase, task)
    }

    /// System prompt for a crew agent
    pub fn crew_system(agent: &CrewAgent) -> String {
        format!(
            "You are the {} on a small team working on the user's request.\n{}",
            agent.name, agent.instructions
        )
    }

    /// Messages for one graph phase.
    ///
    /// `prior` holds `(phase name, output)` pairs of the phases that succeeded.
    pub fn phase_messages(
        phase: GraphPhase,
        original: &[ChatMessage],
        prior: &[(String, String)],
    ) -> Vec<ChatMessage> {
        Self::step_messages(Self::phase_system(phase), original, prior)
    }

    /// Messages for one crew agent.
    ///
    /// `prior` holds `(agent name, output)` pairs of the agents that succeeded.
    pub fn crew_messages(
        agent: &CrewAgent,
        original: &[ChatMessage],
        prior: &[(String, String)],
    ) -> Vec<ChatMessage> {
        Self::step_messages(Self::crew_system(agent), original, prior)
    }

    /// Labeled concatenation of step outputs: `## Name\n\noutput` blocks.
    pub fn labeled_outputs(outputs: &[(String, String)]) -> String {
        outputs
            .iter()
            .map(|(label, text)| format!("## {}\n\n{}", label, text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn step_messages(
        step_system: String,
        original: &[ChatMessage],
        prior: &[(String, String)],
    ) -> Vec<ChatMessage> {
        // Caller system prompts are kept, after the step instructions.
        let mut system = step_system;
        for msg in original.iter().filter(|m| m.is_system()) {
            system.push_str("\n\n");
            system.push_str(&msg.content);
        }

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(original.iter().filter(|m| !m.is_system()).cloned());

        if !prior.is_empty() {
            messages.push(ChatMessage::user(format!(
                "Work so far:\n\n{}\n\nContinue from here.",
                Self::labeled_outputs(prior)
            )));
        }
        messages
    }
}
