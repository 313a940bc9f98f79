//! Question payloads and answer records.
//!
//! The server sends a question as a description plus four option slots, any of
//! which may be empty. The client keeps only the non-empty slots, in order,
//! each paired with its display index so an answer is always recorded by the
//! text the user actually saw.

use crate::error::{AssessmentError, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of options a question can carry.
pub const MAX_OPTIONS: usize = 4;

/// Wire shape of `GET /api/v1/questions/{key}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDto {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
    #[serde(default)]
    pub option4: Option<String>,
}

/// One displayed option: its position in the filtered list and its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub index: usize,
    pub text: String,
}

/// A validated question as the flow displays and persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub description: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Builds a question from explicit option texts, dropping empty ones.
    pub fn new<I, S>(description: impl Into<String>, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(AssessmentError::malformed("question has no description"));
        }

        let options: Vec<AnswerOption> = options
            .into_iter()
            .map(|text| -> String { text.into() })
            .filter(|text| !text.is_empty())
            .take(MAX_OPTIONS)
            .enumerate()
            .map(|(index, text)| AnswerOption { index, text })
            .collect();

        if options.is_empty() {
            return Err(AssessmentError::malformed("question has no options"));
        }

        Ok(Self {
            description,
            options,
        })
    }

    /// Looks up the option at a display index.
    pub fn option(&self, index: usize) -> Option<&AnswerOption> {
        self.options.get(index)
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

impl TryFrom<QuestionDto> for Question {
    type Error = AssessmentError;

    fn try_from(dto: QuestionDto) -> Result<Self> {
        let description = dto.description.unwrap_or_default();
        let slots = [dto.option1, dto.option2, dto.option3, dto.option4];
        Question::new(description, slots.into_iter().flatten())
    }
}

/// Body of `POST /api/v1/user-data/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_key: String,
    /// The answer's display text, never its positional index.
    #[serde(rename = "userData")]
    pub answer_text: String,
}

/// Response of `POST /api/v1/user-data/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceResponse {
    pub remaining_question_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question_key: Option<String>,
}

/// What the flow does after an answer has been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// More questions remain; fetch this key next.
    Fetch { key: String, remaining: u32 },
    /// The sequence is exhausted; the answered question was the last one.
    Finish,
}

impl AdvanceResponse {
    /// Validates the response and decides the next step.
    ///
    /// A positive count without a (non-empty) next key is malformed.
    pub fn next_step(&self) -> Result<NextStep> {
        if self.remaining_question_count == 0 {
            return Ok(NextStep::Finish);
        }
        match self.next_question_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(NextStep::Fetch {
                key: key.to_string(),
                remaining: self.remaining_question_count,
            }),
            _ => Err(AssessmentError::malformed(format!(
                "{} questions remain but no nextQuestionKey was given",
                self.remaining_question_count
            ))),
        }
    }
}
