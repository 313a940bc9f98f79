//! Flow phases and the read-only snapshot views render from.

use crate::question::Question;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Default bootstrap question key.
pub const DEFAULT_BOOTSTRAP_KEY: &str = "nonRelationalUsage";
/// Remaining-count seed used when a session starts.
pub const DEFAULT_INITIAL_REMAINING_COUNT: u32 = 13;

/// Where the question flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowPhase {
    /// No session started (or it was reset).
    #[default]
    Uninitialized,
    /// A question fetch is in flight.
    Loading,
    /// A question is displayed and can be answered.
    AwaitingAnswer,
    /// The selected answer is being recorded.
    Submitting,
    /// The last answer was recorded; only final submission remains.
    ReadyForFinalSubmission,
    /// Final submission is in flight.
    Finalizing,
    /// The result has been handed off.
    Completed,
    /// The answer was recorded but the flow could not move on: the next
    /// question did not load, or the final count was not persisted.
    Errored,
}

/// Static parameters of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Well-known key of the first question.
    pub bootstrap_key: String,
    /// Remaining-count seeded at session start, before the server has said
    /// anything about the sequence length.
    pub initial_remaining_count: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            bootstrap_key: DEFAULT_BOOTSTRAP_KEY.to_string(),
            initial_remaining_count: DEFAULT_INITIAL_REMAINING_COUNT,
        }
    }
}

/// Everything a view needs to render the flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowSnapshot {
    pub phase: FlowPhase,
    pub question_key: Option<String>,
    pub question: Option<Question>,
    pub selected: Option<usize>,
    pub remaining: Option<u32>,
    /// Human-readable message from the last failed action.
    pub last_error: Option<String>,
}

impl FlowSnapshot {
    /// Label of the primary action button, if one is shown.
    pub fn action_label(&self) -> Option<&'static str> {
        match self.phase {
            FlowPhase::AwaitingAnswer | FlowPhase::Submitting => Some("Next"),
            FlowPhase::ReadyForFinalSubmission | FlowPhase::Finalizing => Some("Submit"),
            FlowPhase::Errored => Some("Retry"),
            _ => None,
        }
    }

    /// Whether the primary action is enabled.
    pub fn action_enabled(&self) -> bool {
        match self.phase {
            FlowPhase::AwaitingAnswer => self.selected.is_some(),
            FlowPhase::ReadyForFinalSubmission | FlowPhase::Errored => true,
            _ => false,
        }
    }

    /// Display text of the selected option.
    pub fn selected_text(&self) -> Option<&str> {
        let question = self.question.as_ref()?;
        let option = question.option(self.selected?)?;
        Some(option.text.as_str())
    }
}

/// Result of a successful `advance` or `retry_fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The next question is displayed.
    NextQuestion { remaining: u32 },
    /// The sequence is exhausted; submit the final result next.
    ReadyForFinalSubmission,
}

/// Result of `resume`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// Persisted state was found and restored.
    Resumed(FlowSnapshot),
    /// Nothing persisted; the caller should send the user to the start.
    NotStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: FlowPhase, selected: Option<usize>) -> FlowSnapshot {
        FlowSnapshot {
            phase,
            question: Some(Question::new("Q1", ["A", "B"]).unwrap()),
            selected,
            ..FlowSnapshot::default()
        }
    }

    #[test]
    fn test_action_label_switches_on_terminal_question() {
        assert_eq!(
            snapshot(FlowPhase::AwaitingAnswer, None).action_label(),
            Some("Next")
        );
        assert_eq!(
            snapshot(FlowPhase::ReadyForFinalSubmission, Some(0)).action_label(),
            Some("Submit")
        );
        assert_eq!(snapshot(FlowPhase::Uninitialized, None).action_label(), None);
    }

    #[test]
    fn test_next_disabled_until_selection() {
        assert!(!snapshot(FlowPhase::AwaitingAnswer, None).action_enabled());
        assert!(snapshot(FlowPhase::AwaitingAnswer, Some(1)).action_enabled());
        assert!(!snapshot(FlowPhase::Submitting, Some(1)).action_enabled());
    }

    #[test]
    fn test_selected_text() {
        assert_eq!(
            snapshot(FlowPhase::AwaitingAnswer, Some(1)).selected_text(),
            Some("B")
        );
        assert_eq!(snapshot(FlowPhase::AwaitingAnswer, Some(7)).selected_text(), None);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            FlowPhase::ReadyForFinalSubmission.to_string(),
            "ready_for_final_submission"
        );
    }
}
