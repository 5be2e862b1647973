// ABOUTME: Typed error taxonomy for a chat session and the user-facing error formatter.
// ABOUTME: The dispatcher matches on ChatError to decide what to log and what to show.

use thiserror::Error;

use crate::constants;

/// Everything that can end a turn (or the whole run) early.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("conversation log display failed: {0}")]
    ConversationLogDisplay(String),

    #[error("input is {tokens} tokens, limit is {limit}")]
    InputTooLong { tokens: usize, limit: usize },

    #[error("main process failed: {0}")]
    MainProcess(String),

    #[error("answer display failed: {0}")]
    AnswerDisplay(String),
}

impl ChatError {
    /// The base message shown to the user for this error.
    pub fn base_message(&self) -> &'static str {
        match self {
            Self::Initialization(_) => constants::INITIALIZE_ERROR_MESSAGE,
            Self::ConversationLogDisplay(_) => constants::CONVERSATION_LOG_ERROR_MESSAGE,
            Self::InputTooLong { .. } => constants::INPUT_TEXT_LIMIT_ERROR_MESSAGE,
            Self::MainProcess(_) => constants::MAIN_PROCESS_ERROR_MESSAGE,
            Self::AnswerDisplay(_) => constants::DISP_ANSWER_ERROR_MESSAGE,
        }
    }

    /// Policy rejections are not failures: no error-level log, no admin hint.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InputTooLong { .. })
    }

    /// Text displayed to the user.
    pub fn user_message(&self) -> String {
        if self.is_rejection() {
            self.base_message().to_string()
        } else {
            build_error_message(self.base_message())
        }
    }

    /// Emit the log entry for this error.
    pub fn log(&self) {
        if self.is_rejection() {
            tracing::warn!(error = %self, "{}", self.base_message());
        } else {
            tracing::error!(error = %self, "{}", self.base_message());
        }
    }
}

/// Append the common administrator hint to a base error message.
pub fn build_error_message(base_message: &str) -> String {
    format!("{}\n{}", base_message, constants::COMMON_ERROR_MESSAGE)
}
