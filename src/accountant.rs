// ABOUTME: Conversation accountant: per-input token guard and history pruning.
// ABOUTME: Keeps SessionState.total_tokens tracking the encoded size of the retained history.

use crate::config::BudgetConfig;
use crate::error::ChatError;
use crate::session::{ChatEntry, Role, SessionState};

/// What a prune pass removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneReport {
    pub evicted_turns: usize,
    pub evicted_entries: usize,
    pub evicted_tokens: usize,
}

/// Enforces the input limit and the history retention limit.
#[derive(Debug, Clone, Copy)]
pub struct ConversationAccountant {
    pub max_input_tokens: usize,
    pub history_token_limit: usize,
}

impl ConversationAccountant {
    pub fn new(max_input_tokens: usize, history_token_limit: usize) -> Self {
        Self {
            max_input_tokens,
            history_token_limit,
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self::new(config.max_input_tokens, config.history_token_limit)
    }

    /// Count the input's tokens and, if within the limit, add them to the session total.
    ///
    /// A rejected input leaves the session untouched.
    pub fn check_and_register(
        &self,
        state: &mut SessionState,
        input_text: &str,
    ) -> Result<usize, ChatError> {
        let input_tokens = state.encoder.count_tokens(input_text);
        if input_tokens > self.max_input_tokens {
            return Err(ChatError::InputTooLong {
                tokens: input_tokens,
                limit: self.max_input_tokens,
            });
        }
        state.total_tokens += input_tokens;
        Ok(input_tokens)
    }

    /// Account for the turn's result, then evict the oldest turns until the
    /// total is back under the retention limit.
    ///
    /// Must run before the current turn is appended: the in-flight turn is
    /// never a candidate, so the total can stay above the limit when the
    /// current turn alone exceeds it.
    pub fn prune(&self, state: &mut SessionState, result: &str) -> PruneReport {
        state.total_tokens += state.encoder.count_tokens(result);

        let mut report = PruneReport::default();
        while state.total_tokens > self.history_token_limit && !state.messages.is_empty() {
            let len = leading_turn_len(&state.messages);
            let evicted: Vec<ChatEntry> = state.messages.drain(..len).collect();
            let tokens: usize = evicted.iter().map(|e| state.entry_tokens(e)).sum();

            state.total_tokens = state.total_tokens.saturating_sub(tokens);
            report.evicted_turns += 1;
            report.evicted_entries += evicted.len();
            report.evicted_tokens += tokens;
        }

        if report.evicted_turns > 0 {
            tracing::debug!(
                evicted_turns = report.evicted_turns,
                evicted_tokens = report.evicted_tokens,
                total_tokens = state.total_tokens,
                "pruned conversation history"
            );
        }
        report
    }
}

/// Length of the oldest turn: a user entry plus its assistant reply, or a
/// single stray entry.
fn leading_turn_len(messages: &[ChatEntry]) -> usize {
    match messages {
        [first, second, ..] if first.role == Role::User && second.role == Role::Assistant => 2,
        _ => 1,
    }
}
