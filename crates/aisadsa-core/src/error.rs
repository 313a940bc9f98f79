//! Error types for the AISADSA client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A client-side precondition that was not met.
///
/// Validation failures never reach the network: the action is blocked and the
/// reason is surfaced inline.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationFailure {
    #[error("Please select an answer before continuing")]
    NoOptionSelected,

    #[error("Option {index} does not exist (question has {available} options)")]
    OptionOutOfRange { index: usize, available: usize },

    #[error("A request is already in progress")]
    RequestInFlight,

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("{0} is required")]
    MissingField(String),

    #[error("You must be signed in to do that")]
    NotAuthenticated,

    #[error("Action not available while {actual} (expected {expected})")]
    InvalidState { expected: String, actual: String },
}

/// The shared error type for every AISADSA crate.
///
/// Remote failures are split into the three kinds the flow treats differently
/// for display purposes; all three are retryable by re-invoking the action.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AssessmentError {
    /// The request did not complete (connection failure, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Server rejected the request ({status}): {message}")]
    ServerRejection { status: u16, message: String },

    /// The server answered 2xx but the body failed shape validation.
    #[error("Invalid response from server: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The request finished after its owner reset or detached; the result was
    /// dropped without touching state.
    #[error("Request superseded; its result was discarded")]
    Superseded,

    /// Session or credential storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssessmentError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::ServerRejection {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates a `MissingField` validation error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Validation(ValidationFailure::MissingField(field.into()))
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::ServerRejection { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            _ => None,
        }
    }

    /// Remote failures can be retried by re-invoking the same action.
    ///
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::ServerRejection { .. } | Self::MalformedResponse(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AssessmentError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for AssessmentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("JSON - {}", err))
    }
}

impl From<toml::de::Error> for AssessmentError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML - {}", err))
    }
}

/// A type alias for `Result<T, AssessmentError>`.
pub type Result<T> = std::result::Result<T, AssessmentError>;
