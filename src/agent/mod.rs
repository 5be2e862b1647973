// ABOUTME: Agent module: the LLM backend seam and its OpenAI-compatible implementation.
// ABOUTME: The dispatcher only sees the ChatBackend trait; providers are built from config.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::ChatEntry;
use crate::tui::state::AgentEvent;

pub mod client;
pub mod provider;

pub use client::OpenAiCompatClient;
pub use provider::create_backend;

/// Produces an answer for a user message given the conversation so far.
///
/// Implementations may stream partial text through `events` as
/// `AgentEvent::TextDelta`; the returned string is the complete answer.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn execute(
        &self,
        history: &[ChatEntry],
        message: &str,
        events: &mpsc::Sender<AgentEvent>,
    ) -> anyhow::Result<String>;

    /// Model identifier shown in the status bar.
    fn model(&self) -> &str;
}
