//! Assessment use case.
//!
//! `AssessmentApp` ties the credential store, the question flow, the chat and
//! the result assembler to one tab session and owns the cross-cutting
//! lifecycle operations (sign-in, logout, entering the flow view).

use aisadsa_core::api::{AuthApi, ChatApi, QuestionApi, ResultApi};
use aisadsa_core::auth::{
    CredentialSource, CredentialStore, Credentials, LoginRequest, RegistrationRequest,
};
use aisadsa_core::chat::ChatSession;
use aisadsa_core::error::{Result, ValidationFailure};
use aisadsa_core::flow::{FlowConfig, FlowEngine, ResumeOutcome};
use aisadsa_core::result::{Artifact, ResultArtifacts, clean_diagram_definition};
use aisadsa_core::store::SessionStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The remote seams an [`AssessmentApp`] talks through.
#[derive(Clone)]
pub struct RemoteServices {
    pub questions: Arc<dyn QuestionApi>,
    pub chat: Arc<dyn ChatApi>,
    pub auth: Arc<dyn AuthApi>,
    pub results: Arc<dyn ResultApi>,
}

impl RemoteServices {
    /// Uses one client for every seam.
    pub fn from_client<A>(client: Arc<A>) -> Self
    where
        A: QuestionApi + ChatApi + AuthApi + ResultApi + 'static,
    {
        Self {
            questions: client.clone(),
            chat: client.clone(),
            auth: client.clone(),
            results: client,
        }
    }
}

/// The two namespaced stores of one tab session.
#[derive(Clone)]
pub struct TabStores {
    pub flow: Arc<dyn SessionStore>,
    pub chat: Arc<dyn SessionStore>,
}

/// What the flow view shows right after it is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabEntry {
    pub flow: ResumeOutcome,
    pub transcript_len: usize,
}

/// One signed-in user's assessment in one tab session.
pub struct AssessmentApp {
    credentials: Arc<dyn CredentialStore>,
    auth: Arc<dyn AuthApi>,
    results: Arc<dyn ResultApi>,
    flow: FlowEngine,
    chat: ChatSession,
}

impl AssessmentApp {
    pub fn new<C>(
        credentials: Arc<C>,
        remote: RemoteServices,
        stores: TabStores,
        flow_config: FlowConfig,
    ) -> Self
    where
        C: CredentialStore + 'static,
    {
        let source: Arc<dyn CredentialSource> = credentials.clone();
        Self {
            flow: FlowEngine::new(remote.questions, source.clone(), stores.flow, flow_config),
            chat: ChatSession::new(remote.chat, source, stores.chat),
            credentials,
            auth: remote.auth,
            results: remote.results,
        }
    }

    pub fn flow(&self) -> &FlowEngine {
        &self.flow
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn current_user(&self) -> Option<Credentials> {
        self.credentials.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    /// Signs in and stores the issued credential.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credentials> {
        let request = LoginRequest::new(username, password)?;
        let credentials = self.auth.login(&request).await?;
        self.credentials.save(&credentials)?;
        info!("Signed in as '{}'", credentials.username);
        Ok(credentials)
    }

    /// Creates an account; the server signs the new user in directly.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Credentials> {
        let request = RegistrationRequest::new(name, email, username, password)?;
        let credentials = self.auth.register(&request).await?;
        self.credentials.save(&credentials)?;
        info!("Registered and signed in as '{}'", credentials.username);
        Ok(credentials)
    }

    /// Clears the credential, the flow state and the chat transcript, and
    /// orphans any in-flight flow or chat request.
    ///
    /// Every clear is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub async fn logout(&self) -> Result<()> {
        let outcomes = [
            ("flow state", self.flow.reset().await),
            ("chat transcript", self.chat.clear().await),
            ("credentials", self.credentials.clear()),
        ];

        let mut first_error = None;
        for (what, outcome) in outcomes {
            if let Err(e) = outcome {
                error!("Failed to clear {} on logout: {}", what, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Signed out");
                Ok(())
            }
        }
    }

    /// Entry into the flow view: restores the flow and the transcript from
    /// the tab session without any network call.
    pub async fn enter(&self) -> Result<TabEntry> {
        if !self.is_authenticated() {
            return Err(ValidationFailure::NotAuthenticated.into());
        }
        let flow = self.flow.resume().await?;
        let transcript_len = self.chat.hydrate().await?;
        Ok(TabEntry {
            flow,
            transcript_len,
        })
    }

    /// The flow view went away; late results from its requests are dropped.
    pub async fn leave(&self) {
        self.flow.detach().await;
        self.chat.detach().await;
    }

    /// Submits the final answer set and assembles the result view.
    pub async fn finish(&self) -> Result<ResultArtifacts> {
        let report = self.flow.submit_final().await?;
        self.assemble_results(report).await
    }

    /// Fetches the explanation and diagram for a report.
    ///
    /// Both are requested concurrently and fail independently.
    pub async fn assemble_results(&self, report: String) -> Result<ResultArtifacts> {
        let credentials = self
            .credentials
            .current()
            .ok_or(ValidationFailure::NotAuthenticated)?;

        let (explanation, diagram) = tokio::join!(
            self.results.generate_document(&credentials),
            self.results.generate_diagram(&credentials),
        );

        let explanation = match explanation {
            Ok(text) => Artifact::Ready(text),
            Err(e) => {
                warn!("Explanation unavailable: {}", e);
                Artifact::Failed(e.to_string())
            }
        };
        let diagram = match diagram {
            Ok(raw) => Artifact::Ready(clean_diagram_definition(&raw)),
            Err(e) => {
                warn!("Diagram unavailable: {}", e);
                Artifact::Failed(e.to_string())
            }
        };

        Ok(ResultArtifacts {
            report,
            explanation,
            diagram,
        })
    }
}

impl std::fmt::Debug for AssessmentApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentApp")
            .field("authenticated", &self.is_authenticated())
            .field("flow", &self.flow)
            .finish_non_exhaustive()
    }
}
