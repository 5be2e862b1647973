// ABOUTME: Turn dispatcher: guards the input, routes to the LLM or to staff, displays, appends.
// ABOUTME: Each turn walks an explicit phase machine; any failure ends the turn without appending.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::accountant::{ConversationAccountant, PruneReport};
use crate::agent::ChatBackend;
use crate::constants;
use crate::error::ChatError;
use crate::notify::Notifier;
use crate::session::{ChatEntry, ContactMode, SessionState};
use crate::tui::state::AgentEvent;

/// Which collaborator answers a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Llm,
    Notify,
}

impl Route {
    pub fn for_mode(mode: ContactMode) -> Self {
        match mode {
            ContactMode::Off => Self::Llm,
            ContactMode::On => Self::Notify,
        }
    }

    /// Busy-indicator text while the route is executing.
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Llm => constants::SPINNER_TEXT,
            Self::Notify => constants::SPINNER_CONTACT_TEXT,
        }
    }
}

/// Where a turn currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    InputReceived,
    Guarded,
    Executing(Route),
    Displayed,
    Appended,
}

impl TurnPhase {
    /// Forward-only transitions; every phase may fall back to Idle on failure.
    pub fn can_advance_to(self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        matches!(
            (self, next),
            (Idle, InputReceived)
                | (InputReceived, Guarded)
                | (Guarded, Executing(_))
                | (Executing(_), Displayed)
                | (Displayed, Appended)
                | (InputReceived | Guarded | Executing(_) | Displayed | Appended, Idle)
        )
    }
}

/// Phase trail of a single turn.
#[derive(Debug)]
struct Turn {
    phases: Vec<TurnPhase>,
}

impl Turn {
    fn start() -> Self {
        Self {
            phases: vec![TurnPhase::Idle],
        }
    }

    fn current(&self) -> TurnPhase {
        self.phases.last().copied().unwrap_or(TurnPhase::Idle)
    }

    fn advance(&mut self, next: TurnPhase) {
        debug_assert!(
            self.current().can_advance_to(next),
            "invalid turn transition {:?} -> {:?}",
            self.current(),
            next
        );
        tracing::trace!(from = ?self.current(), to = ?next, "turn phase");
        self.phases.push(next);
    }
}

/// Outcome of a completed turn.
#[derive(Debug)]
pub struct TurnReport {
    pub route: Route,
    pub input_tokens: usize,
    pub answer: String,
    pub pruned: PruneReport,
    pub phases: Vec<TurnPhase>,
}

/// Runs chat turns against a session.
pub struct Dispatcher {
    accountant: ConversationAccountant,
    backend: Arc<dyn ChatBackend>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(
        accountant: ConversationAccountant,
        backend: Arc<dyn ChatBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            accountant,
            backend,
            notifier,
        }
    }

    /// Run one turn. Errors are logged and shown to the user before being returned.
    pub async fn run_turn(
        &self,
        state: &mut SessionState,
        input: &str,
        events: &mpsc::Sender<AgentEvent>,
    ) -> Result<TurnReport, ChatError> {
        let mut turn = Turn::start();
        let result = self.execute_turn(&mut turn, state, input, events).await;
        turn.advance(TurnPhase::Idle);

        match result {
            Ok((route, input_tokens, answer, pruned)) => Ok(TurnReport {
                route,
                input_tokens,
                answer,
                pruned,
                phases: turn.phases,
            }),
            Err(err) => {
                err.log();
                let _ = events.send(AgentEvent::Error(err.user_message())).await;
                Err(err)
            }
        }
    }

    async fn execute_turn(
        &self,
        turn: &mut Turn,
        state: &mut SessionState,
        input: &str,
        events: &mpsc::Sender<AgentEvent>,
    ) -> Result<(Route, usize, String, PruneReport), ChatError> {
        turn.advance(TurnPhase::InputReceived);

        let input_tokens = self.accountant.check_and_register(state, input)?;
        turn.advance(TurnPhase::Guarded);
        tracing::info!(
            session_id = %state.session_id,
            input_tokens,
            total_tokens = state.total_tokens,
            message = %input,
            "inbound message"
        );

        events
            .send(AgentEvent::UserMessage(input.to_string()))
            .await
            .map_err(|e| ChatError::ConversationLogDisplay(e.to_string()))?;
        let _ = events
            .send(AgentEvent::Usage {
                total_tokens: state.total_tokens,
            })
            .await;

        // Route is fixed by the mode at the start of the turn.
        let route = Route::for_mode(state.contact_mode);
        turn.advance(TurnPhase::Executing(route));
        let _ = events
            .send(AgentEvent::TurnStarted {
                status: route.status_text().to_string(),
            })
            .await;

        let answer = match route {
            Route::Llm => self.backend.execute(&state.messages, input, events).await,
            Route::Notify => self.notifier.notify(input, &state.messages).await,
        }
        .map_err(|e| ChatError::MainProcess(format!("{:#}", e)))?;

        let pruned = self.accountant.prune(state, &answer);

        events
            .send(AgentEvent::Answer(answer.clone()))
            .await
            .map_err(|e| ChatError::AnswerDisplay(e.to_string()))?;
        turn.advance(TurnPhase::Displayed);
        // Pruned always follows Answer.
        if pruned.evicted_turns > 0 {
            let _ = events
                .send(AgentEvent::Pruned {
                    evicted_turns: pruned.evicted_turns,
                })
                .await;
        }
        tracing::info!(
            session_id = %state.session_id,
            route = ?route,
            message = %answer,
            "outbound result"
        );

        state.messages.push(ChatEntry::user(input));
        state.messages.push(ChatEntry::assistant(answer.clone()));
        turn.advance(TurnPhase::Appended);
        let _ = events
            .send(AgentEvent::Usage {
                total_tokens: state.total_tokens,
            })
            .await;

        Ok((route, input_tokens, answer, pruned))
    }
}
