//! Post-completion artifacts shown on the result view.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static VERSION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mermaid version \d+\.\d+\.\d+").expect("version marker pattern")
});
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```mermaid[^\n]*\n?").expect("opening fence pattern"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("closing fence pattern"));

/// One artifact fetched after final submission.
///
/// Artifacts fail independently: a failed fetch keeps its message so the
/// view can show it next to the artifacts that did arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Artifact {
    Ready(String),
    Failed(String),
}

impl Artifact {
    pub fn as_ready(&self) -> Option<&str> {
        match self {
            Self::Ready(text) => Some(text),
            Self::Failed(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Everything the result view renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultArtifacts {
    /// Text returned by final submission.
    pub report: String,
    /// Narrative explanation of the recommendation.
    pub explanation: Artifact,
    /// Mermaid diagram definition, already cleaned.
    pub diagram: Artifact,
}

/// Strips the decorations the diagram endpoint wraps around a definition.
pub fn clean_diagram_definition(raw: &str) -> String {
    let text = VERSION_MARKER.replace_all(raw, "");
    let text = OPENING_FENCE.replace(&text, "");
    let text = CLOSING_FENCE.replace(&text, "");
    text.trim().to_string()
}
