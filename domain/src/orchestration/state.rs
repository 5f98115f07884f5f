//! Per-invocation orchestration lifecycle

use std::fmt;

/// `Start → Running (per phase/agent/attempt) → Done | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Start,
    /// 1-based index of the phase, agent, or attempt in flight.
    Running { step: usize },
    Done,
    Failed,
}

impl InvocationState {
    /// Move to the next running step. Terminal states stay put.
    pub fn advance(self) -> Self {
        match self {
            InvocationState::Start => InvocationState::Running { step: 1 },
            InvocationState::Running { step } => InvocationState::Running { step: step + 1 },
            terminal => terminal,
        }
    }

    pub fn finish(self, success: bool) -> Self {
        if self.is_terminal() {
            return self;
        }
        if success {
            InvocationState::Done
        } else {
            InvocationState::Failed
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvocationState::Done | InvocationState::Failed)
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationState::Start => f.write_str("start"),
            InvocationState::Running { step } => write!(f, "running({step})"),
            InvocationState::Done => f.write_str("done"),
            InvocationState::Failed => f.write_str("failed"),
        }
    }
}
