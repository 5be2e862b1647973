// ABOUTME: Contact-mode escalation: forwards the user's inquiry to a Slack channel.
// ABOUTME: Used by the dispatcher instead of the LLM backend while contact mode is on.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::ContactConfig;
use crate::session::ChatEntry;

/// Delivers a user's inquiry to a human and returns the text shown to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, history: &[ChatEntry]) -> anyhow::Result<String>;
}

/// Build the Slack message for an inquiry with recent conversation as context.
pub fn format_inquiry(
    message: &str,
    history: &[ChatEntry],
    context_entries: usize,
    received_at: DateTime<Local>,
) -> String {
    let mut text = format!(
        "*New inquiry*\nReceived: {}\n\n>{}",
        received_at.format("%Y-%m-%d %H:%M:%S"),
        message.replace('\n', "\n>")
    );

    let start = history.len().saturating_sub(context_entries);
    let recent = &history[start..];
    if !recent.is_empty() {
        text.push_str("\n\n*Recent conversation*");
        for entry in recent {
            text.push_str(&format!("\n• {}: {}", entry.role.as_str(), entry.content));
        }
    }
    text
}

/// Posts inquiries with Slack's `chat.postMessage`.
pub struct SlackNotifier {
    http: Client,
    api_base_url: String,
    bot_token: String,
    channel: String,
    thanks_message: String,
    history_context: usize,
}

impl SlackNotifier {
    /// Build from config, reading the bot token from the configured variable.
    pub fn from_config(config: &ContactConfig) -> anyhow::Result<Self> {
        let bot_token = std::env::var(&config.bot_token_env)
            .map_err(|_| anyhow::anyhow!("{} is not set", config.bot_token_env))?;
        Self::new(config, bot_token)
    }

    pub fn new(config: &ContactConfig, bot_token: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            channel: config.channel.clone(),
            thanks_message: config.thanks_message.clone(),
            history_context: config.history_context,
        })
    }
}

/// Slack answers HTTP 200 with `ok: false` on failure; surface its error code.
pub fn check_slack_response(body: &Value) -> anyhow::Result<()> {
    if body["ok"].as_bool().unwrap_or(false) {
        return Ok(());
    }
    anyhow::bail!(
        "chat.postMessage error: {}",
        body["error"].as_str().unwrap_or("unknown")
    )
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str, history: &[ChatEntry]) -> anyhow::Result<String> {
        let text = format_inquiry(message, history, self.history_context, Local::now());

        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.api_base_url))
            .bearer_auth(&self.bot_token)
            .json(&json!({
                "channel": self.channel,
                "text": text,
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        check_slack_response(&body)?;

        tracing::info!(channel = %self.channel, "inquiry forwarded to slack");
        Ok(self.thanks_message.clone())
    }
}

/// Stand-in used when Slack is not configured; every escalation fails with the reason.
pub struct UnavailableNotifier {
    pub reason: String,
}

#[async_trait]
impl Notifier for UnavailableNotifier {
    async fn notify(&self, _message: &str, _history: &[ChatEntry]) -> anyhow::Result<String> {
        anyhow::bail!("contact channel unavailable: {}", self.reason)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn inquiry_contains_message_and_timestamp() {
        let text = format_inquiry("My order has not arrived", &[], 6, at());
        assert!(text.contains(">My order has not arrived"));
        assert!(text.contains("2026-03-14 09:30:00"));
        assert!(!text.contains("Recent conversation"));
    }

    #[test]
    fn multiline_inquiry_stays_quoted() {
        let text = format_inquiry("line one\nline two", &[], 6, at());
        assert!(text.contains(">line one\n>line two"));
    }

    #[test]
    fn inquiry_includes_only_recent_history() {
        let history = vec![
            ChatEntry::user("old question"),
            ChatEntry::assistant("old answer"),
            ChatEntry::user("new question"),
            ChatEntry::assistant("new answer"),
        ];
        let text = format_inquiry("help", &history, 2, at());
        assert!(text.contains("Recent conversation"));
        assert!(text.contains("user: new question"));
        assert!(text.contains("assistant: new answer"));
        assert!(!text.contains("old question"));
    }

    #[test]
    fn slack_ok_response_passes() {
        assert!(check_slack_response(&json!({"ok": true, "ts": "1.2"})).is_ok());
    }

    #[test]
    fn slack_error_code_is_surfaced() {
        let err = check_slack_response(&json!({"ok": false, "error": "channel_not_found"}))
            .unwrap_err();
        assert!(err.to_string().contains("channel_not_found"));
    }

    #[test]
    fn missing_bot_token_is_an_error() {
        let config = ContactConfig {
            bot_token_env: "DESKCHAT_TEST_SLACK_TOKEN_NEVER_SET".to_string(),
            ..Default::default()
        };
        let err = SlackNotifier::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("DESKCHAT_TEST_SLACK_TOKEN_NEVER_SET"));
    }

    #[tokio::test]
    async fn unavailable_notifier_always_fails() {
        let notifier = UnavailableNotifier {
            reason: "SLACK_BOT_TOKEN is not set".to_string(),
        };
        let err = notifier.notify("hello", &[]).await.unwrap_err();
        assert!(err.to_string().contains("SLACK_BOT_TOKEN"));
    }
}
