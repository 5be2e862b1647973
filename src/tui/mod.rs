// ABOUTME: TUI module: ratatui full-screen chat interface for deskchat.
// ABOUTME: Chat display, input handling, and status bar.

pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

pub use state::*;
