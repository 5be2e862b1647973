// ABOUTME: Per-session conversation state: message history, token counter, and contact mode.
// ABOUTME: Created once by the initializer and passed explicitly to every handler.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tokens::TokenEncoder;

/// Author of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
}

impl ChatEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Whether messages go to a human instead of the LLM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMode {
    #[default]
    Off,
    On,
}

impl ContactMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl fmt::Display for ContactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::On => write!(f, "on"),
        }
    }
}

/// Mutable state for a single chat session.
pub struct SessionState {
    pub session_id: String,
    pub messages: Vec<ChatEntry>,
    pub total_tokens: usize,
    pub contact_mode: ContactMode,
    pub encoder: Arc<dyn TokenEncoder>,
    initialized: bool,
}

impl SessionState {
    pub fn new(
        session_id: impl Into<String>,
        encoder: Arc<dyn TokenEncoder>,
        contact_mode: ContactMode,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            total_tokens: 0,
            contact_mode,
            encoder,
            initialized: false,
        }
    }

    /// Mark the session as initialized. Returns true only on the first call.
    pub fn mark_initialized(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Token count of a single entry under this session's encoder.
    pub fn entry_tokens(&self, entry: &ChatEntry) -> usize {
        self.encoder.count_tokens(&entry.content)
    }

    /// Recount the whole history from scratch.
    pub fn history_tokens(&self) -> usize {
        self.messages.iter().map(|m| self.entry_tokens(m)).sum()
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("session_id", &self.session_id)
            .field("messages", &self.messages.len())
            .field("total_tokens", &self.total_tokens)
            .field("contact_mode", &self.contact_mode)
            .field("encoder", &self.encoder.name())
            .field("initialized", &self.initialized)
            .finish()
    }
}

/// A session id derived from the current time, unique per process start.
pub fn new_session_id() -> String {
    chrono::Utc::now().format("%Y%m%dT%H%M%S%3f").to_string()
}
