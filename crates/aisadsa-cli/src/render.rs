//! Terminal rendering of flow, chat and result views.

use aisadsa_core::chat::{ChatMessage, Sender};
use aisadsa_core::error::AssessmentError;
use aisadsa_core::flow::{FlowPhase, FlowSnapshot};
use aisadsa_core::result::{Artifact, ResultArtifacts};
use colored::Colorize;

/// Approximate pixel width of one terminal column.
const COLUMN_PX: u32 = 8;

pub fn snapshot(snapshot: &FlowSnapshot) {
    let Some(question) = snapshot.question.as_ref() else {
        println!(
            "{}",
            "No assessment in progress. Run 'start' to begin.".bright_black()
        );
        return;
    };

    if let Some(remaining) = snapshot.remaining {
        println!(
            "{}",
            format!("Questions remaining: {}", remaining).bright_black()
        );
    }
    println!("{}", question.description.bold());
    for option in &question.options {
        let marker = if snapshot.selected == Some(option.index) {
            "(*)".bright_green()
        } else {
            "( )".normal()
        };
        println!("  {} {}. {}", marker, option.index + 1, option.text);
    }
    if let Some((hint, enabled)) = action_hint(snapshot) {
        if enabled {
            println!("{}", hint.bright_cyan().bold());
        } else {
            println!("{}", hint.bright_black());
        }
    }

    match snapshot.phase {
        FlowPhase::ReadyForFinalSubmission => {
            println!("{}", "All questions answered. Run 'submit'.".bright_yellow())
        }
        FlowPhase::Errored => println!(
            "{}",
            "Your answer was saved but the session could not move on. Run 'retry'."
                .bright_yellow()
        ),
        FlowPhase::Completed => println!("{}", "Assessment submitted.".bright_green()),
        _ => {}
    }
    if let Some(error) = &snapshot.last_error {
        println!("{}", error.red());
    }
}

pub fn transcript(messages: &[ChatMessage], pane_width: u32) {
    if messages.is_empty() {
        println!("{}", "No messages yet.".bright_black());
        return;
    }
    for message in messages {
        chat_message(message, pane_width);
    }
}

pub fn chat_message(message: &ChatMessage, pane_width: u32) {
    let columns = (pane_width / COLUMN_PX).max(20) as usize;
    let label = match message.sender {
        Sender::User => "you".green(),
        Sender::Assistant if message.is_error => "assistant".red(),
        Sender::Assistant => "assistant".bright_blue(),
    };
    println!("{}", format!("[{}]", label).bold());
    for line in wrap(&message.text, columns) {
        if message.is_error {
            println!("  {}", line.red());
        } else {
            println!("  {}", line);
        }
    }
}

pub fn results(artifacts: &ResultArtifacts) {
    println!("{}", "=== Result ===".bright_magenta().bold());
    println!("{}", artifacts.report);
    println!();
    println!("{}", "=== Explanation ===".bright_magenta().bold());
    artifact(&artifacts.explanation);
    println!();
    println!("{}", "=== Architecture diagram (mermaid) ===".bright_magenta().bold());
    artifact(&artifacts.diagram);
}

fn artifact(artifact: &Artifact) {
    match artifact {
        Artifact::Ready(text) => println!("{}", text),
        Artifact::Failed(message) => println!("{}", format!("Unavailable: {}", message).red()),
    }
}

pub fn error(err: &AssessmentError) {
    let text = err.to_string();
    if err.is_validation() {
        println!("{}", text.yellow());
    } else if err.is_retryable() {
        println!("{}", format!("{} (try again)", text).red());
    } else {
        println!("{}", text.red());
    }
}

/// Label of the primary action and whether it is available.
fn action_hint(snapshot: &FlowSnapshot) -> Option<(String, bool)> {
    let label = snapshot.action_label()?;
    Some((format!("[{}]", label), snapshot.action_enabled()))
}

/// Greedy word wrap; words longer than `columns` get their own line.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > columns {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_hint_follows_phase() {
        let mut snapshot = FlowSnapshot {
            phase: FlowPhase::AwaitingAnswer,
            ..FlowSnapshot::default()
        };
        assert_eq!(action_hint(&snapshot), Some(("[Next]".to_string(), false)));

        snapshot.selected = Some(0);
        assert_eq!(action_hint(&snapshot), Some(("[Next]".to_string(), true)));

        snapshot.phase = FlowPhase::ReadyForFinalSubmission;
        assert_eq!(
            action_hint(&snapshot),
            Some(("[Submit]".to_string(), true))
        );

        snapshot.phase = FlowPhase::Completed;
        assert_eq!(action_hint(&snapshot), None);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("one\n\ntwo", 10), vec!["one", "", "two"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abcdefgh"]);
    }
}
