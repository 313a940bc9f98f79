use super::state::{AdvanceOutcome, FlowConfig, FlowPhase, FlowSnapshot, ResumeOutcome};
use crate::api::QuestionApi;
use crate::auth::{CredentialSource, Credentials};
use crate::error::{AssessmentError, Result, ValidationFailure};
use crate::question::{AnswerSubmission, NextStep, Question};
use crate::store::{FlowSlots, PersistedFlow, SessionStore};
use crate::ticket::{RequestGate, Ticket};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Work left over after the server accepted an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    /// The follow-up question has not been fetched yet.
    Fetch { key: String, remaining: u32 },
    /// The sequence finished but the zero count was not persisted.
    Finish,
}

#[derive(Debug, Default)]
struct FlowState {
    phase: FlowPhase,
    current: Option<PersistedFlow>,
    selected: Option<usize>,
    pending: Option<Pending>,
    last_error: Option<String>,
    gate: RequestGate,
}

impl FlowState {
    fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            phase: self.phase,
            question_key: self.current.as_ref().map(|c| c.question_key.clone()),
            question: self.current.as_ref().map(|c| c.question.clone()),
            selected: self.selected,
            remaining: self.current.as_ref().map(|c| c.remaining),
            last_error: self.last_error.clone(),
        }
    }

    fn expect_phase(&self, expected: FlowPhase) -> std::result::Result<(), ValidationFailure> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ValidationFailure::InvalidState {
                expected: expected.to_string(),
                actual: self.phase.to_string(),
            })
        }
    }

    /// Settles a busy phase back to where its request started from.
    fn settle(&mut self) {
        self.phase = match self.phase {
            FlowPhase::Submitting => FlowPhase::AwaitingAnswer,
            FlowPhase::Finalizing => FlowPhase::ReadyForFinalSubmission,
            FlowPhase::Loading if self.pending.is_some() => FlowPhase::Errored,
            FlowPhase::Loading if self.current.is_some() => FlowPhase::AwaitingAnswer,
            FlowPhase::Loading => FlowPhase::Uninitialized,
            other => other,
        };
    }

    fn fail(&mut self, phase: FlowPhase, err: &AssessmentError) {
        self.phase = phase;
        self.last_error = Some(err.to_string());
    }
}

/// Drives the user through the server-determined question sequence.
///
/// The engine owns the flow namespace of the session store. Every method
/// takes `&self`; state lives behind a mutex that is never held across a
/// network call, and a [`RequestGate`] keeps at most one flow request in
/// flight. A request whose ticket was invalidated (by [`FlowEngine::reset`],
/// [`FlowEngine::detach`] or [`FlowEngine::resume`]) finishes with
/// [`AssessmentError::Superseded`] and leaves state and storage untouched.
pub struct FlowEngine {
    api: Arc<dyn QuestionApi>,
    credentials: Arc<dyn CredentialSource>,
    slots: FlowSlots,
    config: FlowConfig,
    state: Mutex<FlowState>,
}

impl FlowEngine {
    pub fn new(
        api: Arc<dyn QuestionApi>,
        credentials: Arc<dyn CredentialSource>,
        store: Arc<dyn SessionStore>,
        config: FlowConfig,
    ) -> Self {
        Self {
            api,
            credentials,
            slots: FlowSlots::new(store),
            config,
            state: Mutex::new(FlowState::default()),
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    fn require_credentials(&self) -> Result<Credentials> {
        self.credentials
            .current()
            .ok_or_else(|| ValidationFailure::NotAuthenticated.into())
    }

    /// Starts a new session from the bootstrap question.
    ///
    /// On success the question, the bootstrap key and the seeded remaining
    /// count are persisted and the flow awaits an answer. On failure nothing
    /// is persisted and the flow returns to the phase it was in.
    pub async fn start_session(&self) -> Result<FlowSnapshot> {
        let credentials = self.require_credentials()?;
        let (ticket, previous) = {
            let mut state = self.state.lock().await;
            let ticket = state.gate.issue()?;
            let previous = state.phase;
            state.phase = FlowPhase::Loading;
            state.last_error = None;
            (ticket, previous)
        };

        let key = self.config.bootstrap_key.clone();
        info!("Starting session with bootstrap question '{}'", key);
        let fetched = self.fetch(&credentials, &key).await;

        let mut state = self.state.lock().await;
        if !state.gate.complete(ticket) {
            debug!("Discarding superseded bootstrap fetch");
            return Err(AssessmentError::Superseded);
        }

        let flow = match fetched {
            Ok(question) => PersistedFlow {
                question_key: key,
                question,
                remaining: self.config.initial_remaining_count,
            },
            Err(e) => {
                warn!("Failed to start session: {}", e);
                state.fail(previous, &e);
                return Err(e);
            }
        };

        if let Err(e) = self.slots.save(&flow) {
            error!("Failed to persist new session: {}", e);
            if let Err(clear_err) = self.slots.clear() {
                error!("Failed to roll back partial session state: {}", clear_err);
            }
            state.fail(previous, &e);
            return Err(e);
        }

        state.current = Some(flow);
        state.selected = None;
        state.pending = None;
        state.phase = FlowPhase::AwaitingAnswer;
        Ok(state.snapshot())
    }

    /// Restores the flow from storage without any network call.
    ///
    /// Called on every entry into the flow view. Requests issued by a previous
    /// view are orphaned: their results will be discarded.
    pub async fn resume(&self) -> Result<ResumeOutcome> {
        let persisted = self.slots.load()?;
        let mut state = self.state.lock().await;
        state.gate.invalidate();
        state.selected = None;
        state.pending = None;
        state.last_error = None;

        match persisted {
            Some(flow) => {
                state.phase = if flow.remaining == 0 {
                    FlowPhase::ReadyForFinalSubmission
                } else {
                    FlowPhase::AwaitingAnswer
                };
                debug!(
                    "Resumed question '{}' with {} remaining",
                    flow.question_key, flow.remaining
                );
                state.current = Some(flow);
                Ok(ResumeOutcome::Resumed(state.snapshot()))
            }
            None => {
                state.current = None;
                state.phase = FlowPhase::Uninitialized;
                Ok(ResumeOutcome::NotStarted)
            }
        }
    }

    /// Selects an option of the displayed question. Local only.
    pub async fn select_option(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.gate.is_busy() {
            return Err(ValidationFailure::RequestInFlight.into());
        }
        state.expect_phase(FlowPhase::AwaitingAnswer)?;

        let available = state
            .current
            .as_ref()
            .map(|c| c.question.option_count())
            .unwrap_or(0);
        if index >= available {
            return Err(ValidationFailure::OptionOutOfRange { index, available }.into());
        }

        state.selected = Some(index);
        state.last_error = None;
        Ok(())
    }

    /// Records the selected answer and moves to the next question, or to
    /// final submission when the server reports nothing remains.
    ///
    /// Calling this while any flow request is pending is a no-op that returns
    /// [`ValidationFailure::RequestInFlight`].
    pub async fn advance(&self) -> Result<AdvanceOutcome> {
        let (ticket, submission, credentials) = {
            let mut state = self.state.lock().await;
            if state.gate.is_busy() {
                return Err(ValidationFailure::RequestInFlight.into());
            }
            state.expect_phase(FlowPhase::AwaitingAnswer)?;

            let index = state.selected.ok_or(ValidationFailure::NoOptionSelected)?;
            let current = state
                .current
                .as_ref()
                .ok_or_else(|| AssessmentError::internal("awaiting an answer without a question"))?;
            let option = current.question.option(index).ok_or(
                ValidationFailure::OptionOutOfRange {
                    index,
                    available: current.question.option_count(),
                },
            )?;
            let submission = AnswerSubmission {
                question_key: current.question_key.clone(),
                answer_text: option.text.clone(),
            };
            let credentials = self.require_credentials()?;

            let ticket = state.gate.issue()?;
            state.phase = FlowPhase::Submitting;
            state.last_error = None;
            (ticket, submission, credentials)
        };

        debug!("Recording answer for '{}'", submission.question_key);
        let recorded = self
            .api
            .record_answer(&credentials, &submission)
            .await
            .and_then(|response| response.next_step());

        let (ticket, pending) = {
            let mut state = self.state.lock().await;
            if !state.gate.complete(ticket) {
                debug!("Discarding superseded answer response");
                return Err(AssessmentError::Superseded);
            }

            match recorded {
                Err(e) => {
                    warn!("Failed to record answer: {}", e);
                    state.fail(FlowPhase::AwaitingAnswer, &e);
                    return Err(e);
                }
                Ok(NextStep::Finish) => return self.persist_finish(&mut state),
                Ok(NextStep::Fetch { key, remaining }) => {
                    let previous = state.current.as_ref().map(|c| c.remaining);
                    if previous.is_some_and(|previous| remaining >= previous) {
                        warn!(
                            "Server reported {} remaining after {}; count did not decrease",
                            remaining,
                            previous.unwrap_or_default()
                        );
                    }
                    let ticket = state.gate.issue()?;
                    state.phase = FlowPhase::Loading;
                    state.pending = Some(Pending::Fetch {
                        key: key.clone(),
                        remaining,
                    });
                    (ticket, (key, remaining))
                }
            }
        };

        self.fetch_pending(ticket, pending, &credentials).await
    }

    /// Completes an answer the server already accepted: re-issues the
    /// follow-up fetch, or re-writes the final count that failed to persist.
    /// The answer is not sent again.
    pub async fn retry_fetch(&self) -> Result<AdvanceOutcome> {
        let credentials = self.require_credentials()?;
        let (ticket, pending) = {
            let mut state = self.state.lock().await;
            if state.gate.is_busy() {
                return Err(ValidationFailure::RequestInFlight.into());
            }
            state.expect_phase(FlowPhase::Errored)?;
            let (key, remaining) = match state.pending.clone() {
                Some(Pending::Fetch { key, remaining }) => (key, remaining),
                Some(Pending::Finish) => return self.persist_finish(&mut state),
                None => return Err(AssessmentError::internal("errored without pending work")),
            };
            let ticket = state.gate.issue()?;
            state.phase = FlowPhase::Loading;
            state.last_error = None;
            (ticket, (key, remaining))
        };

        self.fetch_pending(ticket, pending, &credentials).await
    }

    /// Persists the zero count that marks the sequence as finished.
    ///
    /// Until the write succeeds the flow stays `Errored` and the failure is
    /// returned to the caller.
    fn persist_finish(&self, state: &mut FlowState) -> Result<AdvanceOutcome> {
        if let Err(e) = self.slots.save_remaining(0) {
            error!("Failed to persist final remaining count: {}", e);
            state.pending = Some(Pending::Finish);
            state.fail(FlowPhase::Errored, &e);
            return Err(e);
        }
        if let Some(current) = state.current.as_mut() {
            current.remaining = 0;
        }
        state.pending = None;
        state.last_error = None;
        state.phase = FlowPhase::ReadyForFinalSubmission;
        info!("Question sequence complete; ready for final submission");
        Ok(AdvanceOutcome::ReadyForFinalSubmission)
    }

    async fn fetch_pending(
        &self,
        ticket: Ticket,
        (key, remaining): (String, u32),
        credentials: &Credentials,
    ) -> Result<AdvanceOutcome> {
        let fetched = self.fetch(credentials, &key).await;

        let mut state = self.state.lock().await;
        if !state.gate.complete(ticket) {
            debug!("Discarding superseded fetch of '{}'", key);
            return Err(AssessmentError::Superseded);
        }

        let question = match fetched {
            Ok(question) => question,
            Err(e) => {
                warn!("Failed to fetch question '{}': {}", key, e);
                state.fail(FlowPhase::Errored, &e);
                return Err(e);
            }
        };

        let flow = PersistedFlow {
            question_key: key,
            question,
            remaining,
        };
        if let Err(e) = self.slots.save(&flow) {
            error!("Failed to persist question '{}': {}", flow.question_key, e);
            state.fail(FlowPhase::Errored, &e);
            return Err(e);
        }

        info!(
            "Advanced to '{}' with {} remaining",
            flow.question_key, flow.remaining
        );
        let remaining = flow.remaining;
        state.current = Some(flow);
        state.selected = None;
        state.pending = None;
        state.phase = FlowPhase::AwaitingAnswer;
        Ok(AdvanceOutcome::NextQuestion { remaining })
    }

    /// Finalizes the session and returns the result text.
    ///
    /// The result is a hand-off value for the result view; it is never
    /// persisted.
    pub async fn submit_final(&self) -> Result<String> {
        let (ticket, credentials) = {
            let mut state = self.state.lock().await;
            if state.gate.is_busy() {
                return Err(ValidationFailure::RequestInFlight.into());
            }
            state.expect_phase(FlowPhase::ReadyForFinalSubmission)?;
            let credentials = self.require_credentials()?;
            let ticket = state.gate.issue()?;
            state.phase = FlowPhase::Finalizing;
            state.last_error = None;
            (ticket, credentials)
        };

        let submitted = self
            .api
            .submit_final(&credentials)
            .await
            .and_then(|result| {
                if result.trim().is_empty() {
                    Err(AssessmentError::malformed("final submission returned no result"))
                } else {
                    Ok(result)
                }
            });

        let mut state = self.state.lock().await;
        if !state.gate.complete(ticket) {
            debug!("Discarding superseded final submission");
            return Err(AssessmentError::Superseded);
        }

        match submitted {
            Ok(result) => {
                info!("Session finalized");
                state.phase = FlowPhase::Completed;
                Ok(result)
            }
            Err(e) => {
                warn!("Final submission failed: {}", e);
                state.fail(FlowPhase::ReadyForFinalSubmission, &e);
                Err(e)
            }
        }
    }

    /// Clears the flow's session state (not the chat) and discards any
    /// outstanding request.
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.gate.invalidate();
        // The gate survives so ticket generations never repeat.
        let gate = std::mem::take(&mut state.gate);
        *state = FlowState {
            gate,
            ..FlowState::default()
        };
        self.slots.clear()
    }

    /// The owning view went away. Outstanding results will be discarded and
    /// a busy phase settles back to where its request started.
    pub async fn detach(&self) {
        let mut state = self.state.lock().await;
        state.gate.invalidate();
        state.settle();
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        self.state.lock().await.snapshot()
    }

    async fn fetch(&self, credentials: &Credentials, key: &str) -> Result<Question> {
        let dto = self.api.fetch_question(credentials, key).await?;
        Question::try_from(dto)
    }
}

impl std::fmt::Debug for FlowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
