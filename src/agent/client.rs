// ABOUTME: OpenAI-compatible chat completions client with SSE streaming.
// ABOUTME: Forwards text deltas to the TUI and returns the assembled answer.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::agent::ChatBackend;
use crate::session::ChatEntry;
use crate::tui::state::AgentEvent;

/// Longest slice of an error response body kept in the error message.
const ERROR_BODY_LIMIT: usize = 200;

/// One parsed SSE `data:` payload.
#[derive(Debug, PartialEq)]
pub enum SseChunk {
    Delta(String),
    Done,
    /// Keep-alives, role-only deltas, usage frames.
    Skip,
}

/// Connection and request settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

/// Chat backend speaking the OpenAI `/chat/completions` streaming protocol.
pub struct OpenAiCompatClient {
    http: Client,
    settings: ClientSettings,
    system_prompt: String,
}

impl OpenAiCompatClient {
    pub fn new(settings: ClientSettings, system_prompt: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            settings,
            system_prompt: system_prompt.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    /// Build the request body: system prompt, history, then the new message.
    pub fn request_body(&self, history: &[ChatEntry], message: &str) -> Value {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.system_prompt.is_empty() {
            messages.push(json!({"role": "system", "content": self.system_prompt}));
        }
        for entry in history {
            messages.push(json!({"role": entry.role.as_str(), "content": entry.content}));
        }
        messages.push(json!({"role": "user", "content": message}));

        let mut body = json!({
            "model": self.settings.model,
            "messages": messages,
            "max_tokens": self.settings.max_tokens,
            "stream": true,
        });
        if let Some(temperature) = self.settings.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

/// Parse the payload of a single SSE `data:` line.
pub fn parse_sse_data(data: &str) -> SseChunk {
    if data == "[DONE]" {
        return SseChunk::Done;
    }
    let Ok(value) = serde_json::from_str::<Value>(data) else {
        return SseChunk::Skip;
    };
    match value["choices"][0]["delta"]["content"].as_str() {
        Some(text) if !text.is_empty() => SseChunk::Delta(text.to_string()),
        _ => SseChunk::Skip,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

#[async_trait]
impl ChatBackend for OpenAiCompatClient {
    async fn execute(
        &self,
        history: &[ChatEntry],
        message: &str,
        events: &mpsc::Sender<AgentEvent>,
    ) -> anyhow::Result<String> {
        let url = self.endpoint();
        tracing::debug!(url = %url, model = %self.settings.model, history = history.len(), "chat completion request");

        let mut request = self.http.post(&url).json(&self.request_body(history, message));
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "API error {}: {}",
                status.as_u16(),
                truncate_chars(&body, ERROR_BODY_LIMIT)
            );
        }

        let mut answer = String::new();
        // A chunk may end mid-character, so lines are split on raw bytes.
        let mut buffer: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();

        'read: while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);

            while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&raw);
                let Some(data) = line.trim().strip_prefix("data:") else {
                    continue;
                };
                match parse_sse_data(data.trim_start()) {
                    SseChunk::Delta(text) => {
                        answer.push_str(&text);
                        let _ = events.send(AgentEvent::TextDelta(text)).await;
                    }
                    SseChunk::Done => break 'read,
                    SseChunk::Skip => {}
                }
            }
        }

        if answer.is_empty() {
            anyhow::bail!("model returned an empty answer");
        }
        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(system_prompt: &str) -> OpenAiCompatClient {
        OpenAiCompatClient::new(
            ClientSettings {
                base_url: "http://localhost:11434/v1/".to_string(),
                api_key: None,
                model: "llama3".to_string(),
                max_tokens: 256,
                temperature: Some(0.2),
                timeout: Duration::from_secs(5),
            },
            system_prompt,
        )
        .unwrap()
    }

    #[test]
    fn parse_content_delta() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":"Hel"},"finish_reason":null}]}"#;
        assert_eq!(parse_sse_data(data), SseChunk::Delta("Hel".to_string()));
    }

    #[test]
    fn parse_done_marker() {
        assert_eq!(parse_sse_data("[DONE]"), SseChunk::Done);
    }

    #[test]
    fn role_only_and_usage_frames_are_skipped() {
        let role = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_data(role), SseChunk::Skip);
        let usage = r#"{"choices":[],"usage":{"prompt_tokens":5,"completion_tokens":7}}"#;
        assert_eq!(parse_sse_data(usage), SseChunk::Skip);
        assert_eq!(parse_sse_data("not json"), SseChunk::Skip);
    }

    #[test]
    fn request_body_orders_system_history_then_message() {
        let client = client("Be brief.");
        let history = vec![ChatEntry::user("first"), ChatEntry::assistant("reply")];
        let body = client.request_body(&history, "second");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "first");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(messages[3]["content"], "second");
        assert_eq!(body["stream"], true);
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let client = client("");
        let body = client.request_body(&[], "hi");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            client("").endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn truncate_chars_is_utf8_safe() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo wörld", 4), "héll...");
    }
}
