// ABOUTME: Session loop: owns the session state and processes user events one at a time.
// ABOUTME: Turns are serialized here, so the state never needs a lock.

use tokio::sync::mpsc;

use crate::constants;
use crate::dispatch::Dispatcher;
use crate::session::{ContactMode, SessionState, TranscriptLogger};
use crate::tui::state::{AgentEvent, UserEvent};

/// Everything the session loop owns.
pub struct SessionLoopParams {
    pub dispatcher: Dispatcher,
    pub state: SessionState,
    pub transcript: Option<TranscriptLogger>,
}

/// Run the session loop until the user quits or the channel closes.
///
/// Returns the final session state.
pub async fn run_session_loop(
    params: SessionLoopParams,
    mut user_rx: mpsc::Receiver<UserEvent>,
    agent_tx: mpsc::Sender<AgentEvent>,
) -> SessionState {
    let SessionLoopParams {
        dispatcher,
        mut state,
        mut transcript,
    } = params;

    if state.mark_initialized() {
        tracing::info!(
            session_id = %state.session_id,
            encoder = state.encoder.name(),
            contact_mode = %state.contact_mode,
            "{}",
            constants::APP_BOOT_MESSAGE
        );
    }

    while let Some(event) = user_rx.recv().await {
        match event {
            UserEvent::Quit => break,
            UserEvent::Message(text) => {
                // Errors were already logged and shown by the dispatcher.
                if dispatcher.run_turn(&mut state, &text, &agent_tx).await.is_ok() {
                    if let Some(logger) = transcript.as_mut() {
                        let start = state.messages.len().saturating_sub(2);
                        if let Err(e) = logger.log_entries(&state.messages[start..]) {
                            tracing::warn!(error = %e, "failed to write transcript");
                        }
                    }
                }
                let _ = agent_tx.send(AgentEvent::Done).await;
            }
            UserEvent::SetContactMode(mode) => set_contact_mode(&mut state, mode, &agent_tx).await,
            UserEvent::ToggleContactMode => {
                let mode = state.contact_mode.toggled();
                set_contact_mode(&mut state, mode, &agent_tx).await;
            }
        }
    }

    tracing::info!(
        session_id = %state.session_id,
        messages = state.messages.len(),
        total_tokens = state.total_tokens,
        "session ended"
    );
    state
}

async fn set_contact_mode(
    state: &mut SessionState,
    mode: ContactMode,
    agent_tx: &mpsc::Sender<AgentEvent>,
) {
    if state.contact_mode == mode {
        return;
    }
    state.contact_mode = mode;
    tracing::info!(session_id = %state.session_id, contact_mode = %mode, "contact mode changed");
    let _ = agent_tx.send(AgentEvent::ContactModeChanged(mode)).await;
}
