// ABOUTME: App orchestrator: initializes the session, then runs the TUI and session loops.
// ABOUTME: Initialization failures are reported before any screen is drawn.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use crate::accountant::ConversationAccountant;
use crate::agent::{self, ChatBackend};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::ChatError;
use crate::logging;
use crate::notify::{Notifier, SlackNotifier, UnavailableNotifier};
use crate::prompt::SystemPromptBuilder;
use crate::session::{
    ContactMode, SessionLoopParams, SessionState, TranscriptLogger, new_session_id,
    run_session_loop,
};
use crate::tokens::{self, TokenEncoder};
use crate::tui::input::{InputResult, handle_key};
use crate::tui::state::{AgentEvent, ChatMessageKind, TuiState, UserEvent};
use crate::tui::ui;

/// How long an in-flight turn may hold the process open after the user quits.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Everything a session needs, produced by the initializer.
pub struct SessionContext {
    pub state: SessionState,
    pub dispatcher: Dispatcher,
    pub model: String,
}

/// Build the session from config: encoder, LLM backend, and Slack notifier.
///
/// A missing Slack token is not fatal; contact-mode turns fail until it is set.
pub fn initialize(config: &Config) -> Result<SessionContext, ChatError> {
    let init_err = |e: anyhow::Error| ChatError::Initialization(format!("{:#}", e));

    let encoder = tokens::encoder_for(&config.budget.encoding).map_err(init_err)?;
    let system_prompt = SystemPromptBuilder::new().load_standard().build();
    let backend = agent::create_backend(&config.llm, &system_prompt).map_err(init_err)?;

    let notifier: Arc<dyn Notifier> = match SlackNotifier::from_config(&config.contact) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            tracing::warn!(error = %e, "slack notifier unavailable");
            Arc::new(UnavailableNotifier {
                reason: e.to_string(),
            })
        }
    };

    initialize_with(config, encoder, backend, notifier)
}

/// Assemble a session from already-built collaborators.
pub fn initialize_with(
    config: &Config,
    encoder: Arc<dyn TokenEncoder>,
    backend: Arc<dyn ChatBackend>,
    notifier: Arc<dyn Notifier>,
) -> Result<SessionContext, ChatError> {
    if config.budget.max_input_tokens == 0 {
        return Err(ChatError::Initialization(
            "budget.max_input_tokens must be greater than zero".to_string(),
        ));
    }

    let model = backend.model().to_string();
    let state = SessionState::new(new_session_id(), encoder, config.app.contact_mode);
    let accountant = ConversationAccountant::from_config(&config.budget);

    Ok(SessionContext {
        state,
        dispatcher: Dispatcher::new(accountant, backend, notifier),
        model,
    })
}

/// Greeting shown as the first assistant message.
pub fn initial_message(config: &Config, mode: ContactMode) -> &str {
    match mode {
        ContactMode::Off => &config.app.greeting,
        ContactMode::On => &config.app.contact_greeting,
    }
}

/// Top-level application that orchestrates all subsystems.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the application until the user quits.
    pub async fn run(self) -> anyhow::Result<()> {
        let _log_guard = logging::init_logging(&self.config)?;

        let context = match initialize(&self.config) {
            Ok(context) => context,
            Err(e) => {
                e.log();
                eprintln!("{}", e.user_message());
                return Err(e.into());
            }
        };

        let transcript = match TranscriptLogger::new(&context.state.session_id) {
            Ok(logger) => Some(logger),
            Err(e) => {
                tracing::warn!(error = %e, "failed to open transcript");
                None
            }
        };

        let contact_mode = context.state.contact_mode;
        let mut tui = TuiState::new(self.config.app.title.clone(), context.model, contact_mode);
        tui.push_message(
            ChatMessageKind::Assistant,
            initial_message(&self.config, contact_mode).to_string(),
        );

        let (user_tx, user_rx) = mpsc::channel::<UserEvent>(16);
        let (agent_tx, agent_rx) = mpsc::channel::<AgentEvent>(64);

        let session_handle = tokio::spawn(run_session_loop(
            SessionLoopParams {
                dispatcher: context.dispatcher,
                state: context.state,
                transcript,
            },
            user_rx,
            agent_tx,
        ));

        let mut terminal = ratatui::init();
        let result = run_tui(&mut terminal, &mut tui, &user_tx, agent_rx).await;
        ratatui::restore();

        let _ = user_tx.try_send(UserEvent::Quit);
        drop(user_tx);
        let final_state = shutdown_session(session_handle, SHUTDOWN_GRACE).await?;

        match result {
            Ok(()) => {
                if let Some(state) = &final_state {
                    print_exit_screen(state);
                }
                Ok(())
            }
            Err(e) => {
                e.log();
                eprintln!("{}", e.user_message());
                Err(e.into())
            }
        }
    }
}

/// Drive the screen: redraw, then wait for a key press or a session event.
async fn run_tui(
    terminal: &mut DefaultTerminal,
    state: &mut TuiState,
    user_tx: &mpsc::Sender<UserEvent>,
    agent_rx: mpsc::Receiver<AgentEvent>,
) -> Result<(), ChatError> {
    let mut keys = EventStream::new();
    let mut agent_events = ReceiverStream::new(agent_rx);

    loop {
        terminal
            .draw(|frame| ui::render(frame, state))
            .map_err(|e| ChatError::ConversationLogDisplay(e.to_string()))?;

        tokio::select! {
            key_event = keys.next() => match key_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key(state, key) {
                        InputResult::None => {}
                        InputResult::Quit => return Ok(()),
                        InputResult::Event(event) => {
                            if matches!(event, UserEvent::Message(_)) {
                                state.busy = true;
                            }
                            if user_tx.send(event).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ChatError::ConversationLogDisplay(e.to_string())),
                None => return Ok(()),
            },
            agent_event = agent_events.next() => match agent_event {
                Some(event) => state.apply(event),
                None => return Ok(()),
            },
        }
    }
}

/// Wait briefly for the session loop to finish. A turn still waiting on the
/// network after `grace` is aborted and no final state is returned.
async fn shutdown_session(
    mut handle: JoinHandle<SessionState>,
    grace: Duration,
) -> anyhow::Result<Option<SessionState>> {
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(joined) => Ok(Some(joined?)),
        Err(_) => {
            tracing::warn!(grace_ms = grace.as_millis() as u64, "aborting in-flight turn at exit");
            handle.abort();
            Ok(None)
        }
    }
}

/// Print a farewell summary after the TUI exits.
fn print_exit_screen(state: &SessionState) {
    let turns = state.messages.len() / 2;
    println!();
    println!("  \x1b[1mThanks for using deskchat!\x1b[0m");
    println!(
        "  Session {} kept {} turn(s) in context ({} tokens).",
        state.session_id, turns, state.total_tokens
    );
    println!();
}
