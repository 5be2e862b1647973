// ABOUTME: LLM provider factory: creates the right backend based on config.
// ABOUTME: Supports openai, openrouter, and ollama, all over the OpenAI-compatible API.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::ChatBackend;
use crate::agent::client::{ClientSettings, OpenAiCompatClient};
use crate::config::LlmConfig;

/// Default endpoint and API key variable for a provider.
fn provider_defaults(provider: &str) -> anyhow::Result<(&'static str, Option<&'static str>)> {
    match provider {
        "openai" => Ok(("https://api.openai.com/v1", Some("OPENAI_API_KEY"))),
        "openrouter" => Ok(("https://openrouter.ai/api/v1", Some("OPENROUTER_API_KEY"))),
        "ollama" => Ok(("http://localhost:11434/v1", None)),
        other => anyhow::bail!(
            "Unknown LLM provider: '{}'. Expected: openai, openrouter, ollama",
            other
        ),
    }
}

/// Resolve endpoint and credentials for the configured provider.
pub fn client_settings(config: &LlmConfig) -> anyhow::Result<ClientSettings> {
    let (default_url, default_key_env) = provider_defaults(&config.provider)?;

    let base_url = config
        .base_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(default_url)
        .to_string();

    let key_env = config.api_key_env.as_deref().or(default_key_env);
    let api_key = match key_env {
        Some(var) => Some(
            std::env::var(var)
                .map_err(|_| anyhow::anyhow!("{} is not set for provider '{}'", var, config.provider))?,
        ),
        None => None,
    };

    Ok(ClientSettings {
        base_url,
        api_key,
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        timeout: Duration::from_secs(config.timeout_seconds),
    })
}

/// Create a chat backend based on the provider name in config.
pub fn create_backend(
    config: &LlmConfig,
    system_prompt: &str,
) -> anyhow::Result<Arc<dyn ChatBackend>> {
    let settings = client_settings(config)?;
    Ok(Arc::new(OpenAiCompatClient::new(settings, system_prompt)?))
}
