// ABOUTME: TUI state types: chat messages, agent/user events, and the input buffer.
// ABOUTME: Drives the TUI rendering and bridges the session loop to the display.

use crate::session::ContactMode;

/// The kind of a single chat message displayed in the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessageKind {
    User,
    Assistant,
    Error,
    System,
}

/// A single message in the chat display.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub kind: ChatMessageKind,
    pub content: String,
}

/// Events sent from the session loop to the TUI via an mpsc channel.
#[derive(Debug)]
pub enum AgentEvent {
    /// The user's message passed the guard and belongs in the log.
    UserMessage(String),
    /// The turn is executing; carries the busy-indicator text.
    TurnStarted { status: String },
    /// Streaming text delta from the LLM.
    TextDelta(String),
    /// Final answer for the turn.
    Answer(String),
    /// Session token counter changed.
    Usage { total_tokens: usize },
    /// Old turns were dropped from the history sent to the LLM.
    Pruned { evicted_turns: usize },
    ContactModeChanged(ContactMode),
    /// User-facing error text, already formatted.
    Error(String),
    /// The session loop finished processing the event.
    Done,
}

/// Events sent from the TUI to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// User submitted a chat message.
    Message(String),
    SetContactMode(ContactMode),
    ToggleContactMode,
    /// User requested to quit.
    Quit,
}

/// Full TUI application state.
pub struct TuiState {
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub cursor_pos: usize,
    pub scroll_offset: u16,
    /// A turn is running; input is not accepted.
    pub busy: bool,
    pub busy_text: Option<String>,
    pub model: String,
    pub contact_mode: ContactMode,
    pub total_tokens: usize,
    /// Index of the assistant message still receiving deltas.
    streaming_index: Option<usize>,
}

impl TuiState {
    /// Create a new empty TUI state.
    pub fn new(title: String, model: String, contact_mode: ContactMode) -> Self {
        Self {
            title,
            messages: Vec::new(),
            input: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            busy: false,
            busy_text: None,
            model,
            contact_mode,
            total_tokens: 0,
            streaming_index: None,
        }
    }

    /// Add a message to the chat history and reset scroll to bottom.
    pub fn push_message(&mut self, kind: ChatMessageKind, content: String) {
        self.messages.push(ChatMessage { kind, content });
        self.scroll_offset = 0;
    }

    /// Append a streamed delta to the answer in progress, starting one if needed.
    pub fn append_to_last_assistant(&mut self, text: &str) {
        if let Some(msg) = self.streaming_message() {
            msg.content.push_str(text);
            return;
        }
        self.push_message(ChatMessageKind::Assistant, text.to_string());
        self.streaming_index = Some(self.messages.len() - 1);
    }

    /// Show the final answer, replacing any streamed partial text.
    ///
    /// Notices pushed while streaming do not detach the answer from its stream.
    pub fn finish_answer(&mut self, text: String) {
        if let Some(msg) = self.streaming_message() {
            msg.content = text;
            self.streaming_index = None;
            self.scroll_offset = 0;
            return;
        }
        self.streaming_index = None;
        self.push_message(ChatMessageKind::Assistant, text);
    }

    fn streaming_message(&mut self) -> Option<&mut ChatMessage> {
        let index = self.streaming_index?;
        self.messages
            .get_mut(index)
            .filter(|msg| msg.kind == ChatMessageKind::Assistant)
    }

    /// Apply an event from the session loop.
    pub fn apply(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::UserMessage(text) => self.push_message(ChatMessageKind::User, text),
            AgentEvent::TurnStarted { status } => {
                self.busy = true;
                self.busy_text = Some(status);
            }
            AgentEvent::TextDelta(text) => self.append_to_last_assistant(&text),
            AgentEvent::Answer(text) => self.finish_answer(text),
            AgentEvent::Usage { total_tokens } => self.total_tokens = total_tokens,
            AgentEvent::Pruned { evicted_turns } => self.push_message(
                ChatMessageKind::System,
                format!(
                    "{} older turn(s) dropped from the conversation context",
                    evicted_turns
                ),
            ),
            AgentEvent::ContactModeChanged(mode) => {
                self.contact_mode = mode;
                self.push_message(ChatMessageKind::System, format!("contact mode {}", mode));
            }
            AgentEvent::Error(text) => {
                // A failed stream leaves partial text; keep it but stop appending.
                self.streaming_index = None;
                self.push_message(ChatMessageKind::Error, text);
            }
            AgentEvent::Done => {
                self.busy = false;
                self.busy_text = None;
                self.streaming_index = None;
            }
        }
    }

    /// Submit the current input buffer. Returns the trimmed text if non-empty.
    pub fn submit_input(&mut self) -> Option<String> {
        let trimmed = self.input.trim().to_string();
        if trimmed.is_empty() {
            return None;
        }
        self.input.clear();
        self.cursor_pos = 0;
        Some(trimmed)
    }

    /// Clamp the cursor position to the valid character range of the input buffer.
    pub fn clamp_cursor(&mut self) {
        self.cursor_pos = self.cursor_pos.min(self.input_char_len());
    }

    /// Return the current cursor byte index in the UTF-8 input buffer.
    pub fn cursor_byte_index(&self) -> usize {
        char_index_to_byte_index(&self.input, self.cursor_pos)
    }

    /// Return the total number of characters in the input buffer.
    pub fn input_char_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Lines of the input buffer.
    pub fn input_lines(&self) -> Vec<&str> {
        self.input.split('\n').collect()
    }

    pub fn input_line_count(&self) -> usize {
        self.input_lines().len()
    }

    /// Line index and column (in chars) of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.input.chars().take(self.cursor_pos).collect();
        let line = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, col)
    }

    /// Insert a character at the cursor and advance by one character.
    pub fn insert_char_at_cursor(&mut self, c: char) {
        self.clamp_cursor();
        let byte_index = self.cursor_byte_index();
        self.input.insert(byte_index, c);
        self.cursor_pos += 1;
    }

    /// Delete the character before the cursor (backspace behavior).
    pub fn backspace_char(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos == 0 {
            return;
        }

        let end = self.cursor_byte_index();
        let start = char_index_to_byte_index(&self.input, self.cursor_pos - 1);
        self.input.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    /// Delete the character at the cursor (delete behavior).
    pub fn delete_char_at_cursor(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos >= self.input_char_len() {
            return;
        }

        let start = self.cursor_byte_index();
        let end = char_index_to_byte_index(&self.input, self.cursor_pos + 1);
        self.input.replace_range(start..end, "");
    }

    /// Move cursor one character to the left.
    pub fn move_cursor_left(&mut self) {
        self.clamp_cursor();
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    /// Move cursor one character to the right.
    pub fn move_cursor_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos < self.input_char_len() {
            self.cursor_pos += 1;
        }
    }

    /// Move cursor to start of input.
    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    /// Move cursor to end of input.
    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input_char_len();
    }
}

fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }

    match s.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => s.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TuiState {
        TuiState::new("deskchat".to_string(), "m".to_string(), ContactMode::Off)
    }

    #[test]
    fn new_state_is_empty() {
        let state = state();
        assert!(state.messages.is_empty());
        assert_eq!(state.input, "");
        assert_eq!(state.cursor_pos, 0);
        assert!(!state.busy);
        assert_eq!(state.total_tokens, 0);
        assert_eq!(state.contact_mode, ContactMode::Off);
    }

    #[test]
    fn push_message_auto_scrolls() {
        let mut state = state();
        state.scroll_offset = 10;
        state.push_message(ChatMessageKind::User, "hello".to_string());
        assert_eq!(state.scroll_offset, 0);
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn deltas_accumulate_then_answer_replaces() {
        let mut state = state();
        state.apply(AgentEvent::UserMessage("hi".to_string()));
        state.apply(AgentEvent::TextDelta("Hel".to_string()));
        state.apply(AgentEvent::TextDelta("lo".to_string()));
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content, "Hello");

        state.apply(AgentEvent::Answer("Hello!".to_string()));
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content, "Hello!");
    }

    #[test]
    fn answer_without_deltas_pushes_new_message() {
        let mut state = state();
        state.push_message(ChatMessageKind::Assistant, "greeting".to_string());
        state.apply(AgentEvent::UserMessage("contact me".to_string()));
        state.apply(AgentEvent::Answer("Thanks".to_string()));
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[0].content, "greeting");
        assert_eq!(state.messages[2].content, "Thanks");
    }

    #[test]
    fn greeting_is_not_extended_by_deltas() {
        let mut state = state();
        state.push_message(ChatMessageKind::Assistant, "greeting".to_string());
        state.apply(AgentEvent::TextDelta("new".to_string()));
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "greeting");
    }

    #[test]
    fn notice_during_stream_does_not_duplicate_answer() {
        let mut state = state();
        state.apply(AgentEvent::UserMessage("hi".to_string()));
        state.apply(AgentEvent::TextDelta("Hel".to_string()));
        state.apply(AgentEvent::TextDelta("lo".to_string()));
        state.apply(AgentEvent::Pruned { evicted_turns: 1 });
        state.apply(AgentEvent::Answer("Hello!".to_string()));

        let assistants: Vec<_> = state
            .messages
            .iter()
            .filter(|m| m.kind == ChatMessageKind::Assistant)
            .collect();
        assert_eq!(assistants.len(), 1);
        assert_eq!(assistants[0].content, "Hello!");
        assert_eq!(state.messages.len(), 3);
    }

    #[test]
    fn next_turn_streams_into_a_fresh_message() {
        let mut state = state();
        state.apply(AgentEvent::TextDelta("first".to_string()));
        state.apply(AgentEvent::Answer("first".to_string()));
        state.apply(AgentEvent::Done);
        state.apply(AgentEvent::UserMessage("again".to_string()));
        state.apply(AgentEvent::TextDelta("second".to_string()));
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[0].content, "first");
        assert_eq!(state.messages[2].content, "second");
    }

    #[test]
    fn turn_started_and_done_toggle_busy() {
        let mut state = state();
        state.apply(AgentEvent::TurnStarted {
            status: "thinking".to_string(),
        });
        assert!(state.busy);
        assert_eq!(state.busy_text.as_deref(), Some("thinking"));
        state.apply(AgentEvent::Done);
        assert!(!state.busy);
        assert!(state.busy_text.is_none());
    }

    #[test]
    fn error_event_adds_error_message() {
        let mut state = state();
        state.apply(AgentEvent::Error("too long".to_string()));
        assert_eq!(state.messages[0].kind, ChatMessageKind::Error);
    }

    #[test]
    fn contact_mode_change_updates_badge() {
        let mut state = state();
        state.apply(AgentEvent::ContactModeChanged(ContactMode::On));
        assert_eq!(state.contact_mode, ContactMode::On);
        assert_eq!(state.messages[0].kind, ChatMessageKind::System);
    }

    #[test]
    fn submit_input_clears_buffer() {
        let mut state = state();
        state.input = "  hello world  ".to_string();
        state.cursor_pos = 10;
        assert_eq!(state.submit_input(), Some("hello world".to_string()));
        assert_eq!(state.input, "");
        assert_eq!(state.cursor_pos, 0);
    }

    #[test]
    fn submit_empty_input_returns_none() {
        let mut state = state();
        state.input = "   ".to_string();
        assert_eq!(state.submit_input(), None);
        assert_eq!(state.input, "   ");
    }

    #[test]
    fn utf8_input_editing_is_safe() {
        let mut state = state();
        state.insert_char_at_cursor('a');
        state.insert_char_at_cursor('🙂');
        state.insert_char_at_cursor('é');
        assert_eq!(state.input, "a🙂é");
        assert_eq!(state.cursor_pos, 3);

        state.move_cursor_left();
        state.backspace_char();
        assert_eq!(state.input, "aé");
        assert_eq!(state.cursor_pos, 1);

        state.delete_char_at_cursor();
        assert_eq!(state.input, "a");
        assert_eq!(state.cursor_pos, 1);
    }

    #[test]
    fn cursor_line_col_tracks_newlines() {
        let mut state = state();
        state.input = "ab\ncde".to_string();
        state.cursor_pos = 5;
        assert_eq!(state.cursor_line_col(), (1, 2));
        assert_eq!(state.input_line_count(), 2);
    }
}
