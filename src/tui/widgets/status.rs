// ABOUTME: Status bar widget: renders model name, contact mode, token usage, and busy text.
// ABOUTME: Displayed at the bottom of the TUI as a single-line summary.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::session::ContactMode;

/// Inputs for the status bar.
pub struct StatusBarParams<'a> {
    pub model: &'a str,
    pub contact_mode: ContactMode,
    pub total_tokens: usize,
    pub busy_text: Option<&'a str>,
}

/// Render the status bar line.
pub fn status_line(params: &StatusBarParams<'_>) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mode_style = if params.contact_mode.is_on() {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", params.model), Style::default().fg(Color::Cyan)),
        Span::styled("| ", dim),
        Span::styled(format!("contact {} ", params.contact_mode), mode_style),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} tokens ", format_tokens(params.total_tokens)),
            Style::default().fg(Color::White),
        ),
    ];

    if let Some(text) = params.busy_text {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            format!("{} ", text),
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}

/// Format a token count for display: small numbers as-is, thousands as X.Xk, millions as X.XM.
pub fn format_tokens(tokens: usize) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}k", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}
