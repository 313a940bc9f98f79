//! Remote operation seams.
//!
//! The core never talks HTTP itself. These traits describe the server's
//! operations; `aisadsa-infrastructure` provides the REST implementation and
//! tests substitute hand-written mocks.

use crate::auth::{Credentials, LoginRequest, RegistrationRequest};
use crate::error::Result;
use crate::question::{AdvanceResponse, AnswerSubmission, QuestionDto};
use async_trait::async_trait;

/// Question sequence operations.
///
/// # Server contract
///
/// `record_answer` is not known to be idempotent. The client never resends it
/// on its own; a user-initiated retry after a lost response may record the
/// answer twice unless the server deduplicates `{questionKey, userData}`.
#[async_trait]
pub trait QuestionApi: Send + Sync {
    /// `GET /api/v1/questions/{key}`
    async fn fetch_question(&self, credentials: &Credentials, key: &str) -> Result<QuestionDto>;

    /// `POST /api/v1/user-data/create`
    async fn record_answer(
        &self,
        credentials: &Credentials,
        submission: &AnswerSubmission,
    ) -> Result<AdvanceResponse>;

    /// `POST /api/v1/user-data/submit`; returns the free-form result text.
    async fn submit_final(&self, credentials: &Credentials) -> Result<String>;
}

/// Chat completion.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `POST /api/v1/ai/qa` with `{message}`; returns the reply text.
    async fn ask(&self, credentials: &Credentials, message: &str) -> Result<String>;
}

/// Credential issuance.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/v1/auth/login`
    async fn login(&self, request: &LoginRequest) -> Result<Credentials>;

    /// `POST /api/v1/auth/register`
    async fn register(&self, request: &RegistrationRequest) -> Result<Credentials>;
}

/// Post-completion artifacts.
#[async_trait]
pub trait ResultApi: Send + Sync {
    /// `GET /api/v1/ai/document-generation`
    async fn generate_document(&self, credentials: &Credentials) -> Result<String>;

    /// `GET /api/v1/ai/diagram-generation`
    async fn generate_diagram(&self, credentials: &Credentials) -> Result<String>;
}
