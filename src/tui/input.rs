// ABOUTME: Keyboard input handling for the TUI: translates key events into actions.
// ABOUTME: Handles typing, slash commands, contact-mode toggling, and scrolling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::ContactMode;
use crate::tui::state::{ChatMessageKind, TuiState, UserEvent};

/// The result of processing a key event.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    /// No action needed.
    None,
    /// Forward an event to the session loop.
    Event(UserEvent),
    /// User wants to quit.
    Quit,
}

/// Interpret a submitted line: `/contact` and `/quit` become events, everything
/// else (including text that merely starts with `/`) is a message.
pub fn parse_submission(text: &str) -> Result<UserEvent, String> {
    let message = || Ok(UserEvent::Message(text.to_string()));
    let Some(command) = text.strip_prefix('/') else {
        return message();
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("contact"), Some("on"), None) => Ok(UserEvent::SetContactMode(ContactMode::On)),
        (Some("contact"), Some("off"), None) => Ok(UserEvent::SetContactMode(ContactMode::Off)),
        (Some("contact"), None, _) => Ok(UserEvent::ToggleContactMode),
        (Some("contact"), Some(_), _) => Err("usage: /contact [on|off]".to_string()),
        (Some("quit"), None, _) => Ok(UserEvent::Quit),
        _ => message(),
    }
}

/// Process a key event against the current TUI state and return the resulting action.
pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C and Esc always quit, even mid-turn.
    if (ctrl && key.code == KeyCode::Char('c')) || key.code == KeyCode::Esc {
        return InputResult::Quit;
    }

    if handle_scroll_key(state, key.code) {
        return InputResult::None;
    }

    // A running turn owns the session; only scrolling and quitting work.
    if state.busy {
        return InputResult::None;
    }

    if ctrl && key.code == KeyCode::Char('t') {
        return InputResult::Event(UserEvent::ToggleContactMode);
    }

    match key.code {
        // Shift+Enter inserts a newline into the input buffer.
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            state.insert_char_at_cursor('\n');
            InputResult::None
        }
        KeyCode::Enter => {
            let Some(text) = state.submit_input() else {
                return InputResult::None;
            };
            match parse_submission(&text) {
                Ok(UserEvent::Quit) => InputResult::Quit,
                Ok(event) => InputResult::Event(event),
                Err(message) => {
                    state.push_message(ChatMessageKind::System, message);
                    InputResult::None
                }
            }
        }
        KeyCode::Char(c) => {
            state.insert_char_at_cursor(c);
            InputResult::None
        }
        KeyCode::Backspace => {
            state.backspace_char();
            InputResult::None
        }
        KeyCode::Delete => {
            state.delete_char_at_cursor();
            InputResult::None
        }
        KeyCode::Left => {
            state.move_cursor_left();
            InputResult::None
        }
        KeyCode::Right => {
            state.move_cursor_right();
            InputResult::None
        }
        KeyCode::Home => {
            state.move_cursor_home();
            InputResult::None
        }
        KeyCode::End => {
            state.move_cursor_end();
            InputResult::None
        }
        _ => InputResult::None,
    }
}

fn handle_scroll_key(state: &mut TuiState, key: KeyCode) -> bool {
    match key {
        KeyCode::PageUp => {
            state.scroll_offset = state.scroll_offset.saturating_add(10);
            true
        }
        KeyCode::PageDown => {
            state.scroll_offset = state.scroll_offset.saturating_sub(10);
            true
        }
        KeyCode::Up => {
            state.scroll_offset = state.scroll_offset.saturating_add(1);
            true
        }
        KeyCode::Down => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
            true
        }
        _ => false,
    }
}
