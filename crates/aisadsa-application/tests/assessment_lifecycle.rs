use aisadsa_application::{AssessmentApp, RemoteServices, TabStores};
use aisadsa_core::api::{AuthApi, ChatApi, QuestionApi, ResultApi};
use aisadsa_core::auth::{
    CredentialSource, Credentials, LoginRequest, MemoryCredentialStore, RegistrationRequest,
};
use aisadsa_core::chat::{CHAT_FAILURE_TEXT, SendOutcome, Sender};
use aisadsa_core::error::{AssessmentError, Result, ValidationFailure};
use aisadsa_core::flow::{AdvanceOutcome, FlowConfig, FlowPhase, ResumeOutcome};
use aisadsa_core::question::{AdvanceResponse, AnswerSubmission, QuestionDto};
use aisadsa_core::result::Artifact;
use aisadsa_core::store::{MemorySessionStore, SessionStore};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Scripted stand-in for the whole server.
#[derive(Default)]
struct FakeServer {
    answers: Mutex<VecDeque<AdvanceResponse>>,
    login_response: Mutex<Option<Result<Credentials>>>,
    fail_chat: AtomicBool,
    fail_diagram: AtomicBool,
    hold_chat: AtomicBool,
    chat_entered: Notify,
    chat_release: Notify,
    calls: AtomicUsize,
}

impl FakeServer {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl QuestionApi for FakeServer {
    async fn fetch_question(&self, _credentials: &Credentials, key: &str) -> Result<QuestionDto> {
        self.hit();
        Ok(QuestionDto {
            description: Some(format!("Question {}", key)),
            option1: Some("A".to_string()),
            option2: Some("B".to_string()),
            option3: Some(String::new()),
            option4: None,
        })
    }

    async fn record_answer(
        &self,
        _credentials: &Credentials,
        _submission: &AnswerSubmission,
    ) -> Result<AdvanceResponse> {
        self.hit();
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AssessmentError::rejected(409, "sequence exhausted"))
    }

    async fn submit_final(&self, _credentials: &Credentials) -> Result<String> {
        self.hit();
        Ok("Result text".to_string())
    }
}

#[async_trait::async_trait]
impl ChatApi for FakeServer {
    async fn ask(&self, _credentials: &Credentials, message: &str) -> Result<String> {
        self.hit();
        if self.hold_chat.load(Ordering::SeqCst) {
            self.chat_entered.notify_one();
            self.chat_release.notified().await;
        }
        if self.fail_chat.load(Ordering::SeqCst) {
            return Err(AssessmentError::network("connection reset"));
        }
        Ok(format!("echo: {}", message))
    }
}

#[async_trait::async_trait]
impl AuthApi for FakeServer {
    async fn login(&self, request: &LoginRequest) -> Result<Credentials> {
        self.hit();
        self.login_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(credentials(&request.username)))
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<Credentials> {
        self.hit();
        Ok(Credentials {
            name: request.name.clone(),
            email: request.email.clone(),
            ..credentials(&request.username)
        })
    }
}

#[async_trait::async_trait]
impl ResultApi for FakeServer {
    async fn generate_document(&self, _credentials: &Credentials) -> Result<String> {
        self.hit();
        Ok("Use a document store.".to_string())
    }

    async fn generate_diagram(&self, _credentials: &Credentials) -> Result<String> {
        self.hit();
        if self.fail_diagram.load(Ordering::SeqCst) {
            return Err(AssessmentError::rejected(502, "diagram service down"));
        }
        Ok("mermaid version 10.9.1\n```mermaid\ngraph TD\n  App --> Store\n```".to_string())
    }
}

fn credentials(username: &str) -> Credentials {
    Credentials {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        username: username.to_string(),
        email: String::new(),
        name: String::new(),
    }
}

struct Harness {
    server: Arc<FakeServer>,
    credentials: Arc<MemoryCredentialStore>,
    flow_store: MemorySessionStore,
    chat_store: MemorySessionStore,
}

impl Harness {
    fn new(server: FakeServer) -> Self {
        Self {
            server: Arc::new(server),
            credentials: Arc::new(MemoryCredentialStore::new()),
            flow_store: MemorySessionStore::new("flow"),
            chat_store: MemorySessionStore::new("chat"),
        }
    }

    /// A new app over the same stores, as after a reload.
    fn app(&self) -> AssessmentApp {
        AssessmentApp::new(
            self.credentials.clone(),
            RemoteServices::from_client(self.server.clone()),
            TabStores {
                flow: Arc::new(self.flow_store.clone()),
                chat: Arc::new(self.chat_store.clone()),
            },
            FlowConfig {
                bootstrap_key: "nonRelationalUsage".to_string(),
                initial_remaining_count: 2,
            },
        )
    }
}

fn scripted(answers: &[(u32, Option<&str>)]) -> FakeServer {
    let server = FakeServer::default();
    server
        .answers
        .lock()
        .unwrap()
        .extend(answers.iter().map(|(remaining, next)| AdvanceResponse {
            remaining_question_count: *remaining,
            next_question_key: next.map(str::to_string),
        }));
    server
}

#[tokio::test]
async fn test_login_stores_credentials() {
    let harness = Harness::new(FakeServer::default());
    let app = harness.app();

    let signed_in = app.login("  ada ", "secret").await.unwrap();

    assert_eq!(signed_in.username, "ada");
    assert!(app.is_authenticated());
    assert_eq!(harness.credentials.current().unwrap().username, "ada");
}

#[tokio::test]
async fn test_login_validation_never_reaches_server() {
    let harness = Harness::new(FakeServer::default());
    let app = harness.app();

    let err = app.login("ada", "").await.unwrap_err();

    assert_eq!(
        err.as_validation(),
        Some(&ValidationFailure::MissingField("Password".to_string()))
    );
    assert_eq!(harness.server.calls(), 0);
}

#[tokio::test]
async fn test_rejected_login_stores_nothing() {
    let server = FakeServer::default();
    *server.login_response.lock().unwrap() =
        Some(Err(AssessmentError::malformed("response has no accessToken")));
    let harness = Harness::new(server);
    let app = harness.app();

    assert!(app.login("ada", "secret").await.unwrap_err().is_malformed());
    assert!(!app.is_authenticated());
}

#[tokio::test]
async fn test_register_signs_in() {
    let harness = Harness::new(FakeServer::default());
    let app = harness.app();

    let user = app
        .register(" Ada ", "ada@example.com", "ada", "secret")
        .await
        .unwrap();

    assert_eq!(user.name, "Ada");
    assert!(app.is_authenticated());
}

#[tokio::test]
async fn test_full_session_to_results() {
    let harness = Harness::new(scripted(&[(1, Some("q2")), (0, None)]));
    let app = harness.app();
    app.login("ada", "secret").await.unwrap();

    let started = app.flow().start_session().await.unwrap();
    assert_eq!(started.remaining, Some(2));
    assert_eq!(started.question.unwrap().option_count(), 2);

    app.flow().select_option(0).await.unwrap();
    assert_eq!(
        app.flow().advance().await.unwrap(),
        AdvanceOutcome::NextQuestion { remaining: 1 }
    );
    app.flow().select_option(1).await.unwrap();
    assert_eq!(
        app.flow().advance().await.unwrap(),
        AdvanceOutcome::ReadyForFinalSubmission
    );

    let artifacts = app.finish().await.unwrap();

    assert_eq!(artifacts.report, "Result text");
    assert_eq!(
        artifacts.explanation,
        Artifact::Ready("Use a document store.".to_string())
    );
    assert_eq!(
        artifacts.diagram,
        Artifact::Ready("graph TD\n  App --> Store".to_string())
    );
    assert_eq!(app.flow().snapshot().await.phase, FlowPhase::Completed);
}

#[tokio::test]
async fn test_failed_artifact_does_not_hide_others() {
    let server = FakeServer::default();
    server.fail_diagram.store(true, Ordering::SeqCst);
    let harness = Harness::new(server);
    let app = harness.app();
    app.login("ada", "secret").await.unwrap();

    let artifacts = app.assemble_results("Result text".to_string()).await.unwrap();

    assert!(artifacts.explanation.is_ready());
    assert!(matches!(
        artifacts.diagram,
        Artifact::Failed(ref message) if message.contains("diagram service down")
    ));
}

#[tokio::test]
async fn test_reload_restores_flow_and_transcript_offline() {
    let harness = Harness::new(scripted(&[(1, Some("q2"))]));
    let first = harness.app();
    first.login("ada", "secret").await.unwrap();
    first.flow().start_session().await.unwrap();
    first.flow().select_option(0).await.unwrap();
    first.flow().advance().await.unwrap();
    first.chat().send_message("hello").await.unwrap();
    first.leave().await;

    let calls_before = harness.server.calls();
    let reloaded = harness.app();
    let entry = reloaded.enter().await.unwrap();

    let ResumeOutcome::Resumed(snapshot) = entry.flow else {
        panic!("expected a resumed flow");
    };
    assert_eq!(snapshot.question_key.as_deref(), Some("q2"));
    assert_eq!(snapshot.remaining, Some(1));
    assert_eq!(entry.transcript_len, 2);
    assert_eq!(harness.server.calls(), calls_before);
}

#[tokio::test]
async fn test_chat_failure_appends_error_reply() {
    let server = FakeServer::default();
    server.fail_chat.store(true, Ordering::SeqCst);
    let harness = Harness::new(server);
    let app = harness.app();
    app.login("ada", "secret").await.unwrap();

    let outcome = app.chat().send_message("x").await.unwrap();

    let SendOutcome::Replied(reply) = outcome else {
        panic!("expected a reply");
    };
    assert!(reply.is_error);
    assert_eq!(reply.text, CHAT_FAILURE_TEXT);
    let messages = app.chat().messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert!(!app.chat().is_loading().await);
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let harness = Harness::new(scripted(&[(1, Some("q2"))]));
    let app = harness.app();
    app.login("ada", "secret").await.unwrap();
    app.flow().start_session().await.unwrap();
    app.chat().send_message("hello").await.unwrap();
    assert!(!harness.flow_store.is_empty());
    assert!(!harness.chat_store.is_empty());

    app.logout().await.unwrap();

    assert!(!app.is_authenticated());
    assert!(harness.flow_store.is_empty());
    assert!(harness.chat_store.is_empty());
    assert_eq!(
        app.flow().resume().await.unwrap(),
        ResumeOutcome::NotStarted
    );
    assert_eq!(app.flow().snapshot().await.phase, FlowPhase::Uninitialized);
    assert!(app.chat().messages().await.is_empty());
}

#[tokio::test]
async fn test_logout_orphans_pending_chat_reply() {
    let server = FakeServer::default();
    server.hold_chat.store(true, Ordering::SeqCst);
    let harness = Harness::new(server);
    let app = Arc::new(harness.app());
    app.login("ada", "secret").await.unwrap();

    let pending = {
        let app = app.clone();
        tokio::spawn(async move { app.chat().send_message("late").await })
    };
    harness.server.chat_entered.notified().await;
    app.logout().await.unwrap();
    harness.server.chat_release.notify_one();

    assert_eq!(pending.await.unwrap().unwrap(), SendOutcome::Discarded);
    assert!(app.chat().messages().await.is_empty());
    assert_eq!(harness.chat_store.get("chatMessages").unwrap(), None);
}

#[tokio::test]
async fn test_signed_out_actions_never_reach_server() {
    let harness = Harness::new(FakeServer::default());
    let app = harness.app();

    assert!(app.enter().await.unwrap_err().is_validation());
    assert!(app.flow().start_session().await.unwrap_err().is_validation());
    assert!(
        app.assemble_results("r".to_string())
            .await
            .unwrap_err()
            .is_validation()
    );
    assert_eq!(harness.server.calls(), 0);
}
