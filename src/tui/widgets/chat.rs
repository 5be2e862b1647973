// ABOUTME: Chat widget: renders chat messages into styled ratatui Lines.
// ABOUTME: Each message kind (user, assistant, error, system) has distinct visual styling.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::state::{ChatMessage, ChatMessageKind};

/// Render a multi-line message with a styled prefix on the first line.
fn prefixed_lines(
    lines: &mut Vec<Line<'static>>,
    prefix: &'static str,
    prefix_style: Style,
    body_style: Style,
    content: &str,
) {
    for (i, text) in content.split('\n').enumerate() {
        if i == 0 {
            lines.push(Line::from(vec![
                Span::styled(prefix, prefix_style),
                Span::styled(text.to_string(), body_style),
            ]));
        } else {
            lines.push(Line::from(Span::styled(format!("  {}", text), body_style)));
        }
    }
}

/// Render a slice of chat messages into styled Lines for display.
pub fn render_chat_lines(messages: &[ChatMessage]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, msg) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }

        match &msg.kind {
            ChatMessageKind::User => prefixed_lines(
                &mut lines,
                "❯ ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                Style::default(),
                &msg.content,
            ),
            ChatMessageKind::Assistant => prefixed_lines(
                &mut lines,
                "⏺ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                Style::default(),
                &msg.content,
            ),
            ChatMessageKind::Error => prefixed_lines(
                &mut lines,
                "✖ ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::Red),
                &msg.content,
            ),
            ChatMessageKind::System => {
                lines.push(Line::from(Span::styled(
                    format!("[system] {}", msg.content),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    lines
}
