// ABOUTME: Configuration loading for deskchat.
// ABOUTME: Reads ~/.deskchat/config.toml and applies CLI overrides on top.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants;
use crate::session::ContactMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub llm: LlmConfig,
    pub budget: BudgetConfig,
    pub contact: ContactConfig,
    pub logging: LoggingConfig,
}

/// Presentation settings for the chat screen.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub greeting: String,
    pub contact_greeting: String,
    /// Contact mode the session starts in.
    pub contact_mode: ContactMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: constants::APP_NAME.to_string(),
            greeting: constants::INITIAL_AI_MESSAGE.to_string(),
            contact_greeting: constants::INITIAL_CONTACT_MESSAGE.to_string(),
            contact_mode: ContactMode::Off,
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    /// Overrides the provider's default endpoint when set and non-empty.
    pub base_url: Option<String>,
    /// Overrides the provider's default API key variable.
    pub api_key_env: Option<String>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key_env: None,
            max_tokens: 1024,
            temperature: Some(0.5),
            timeout_seconds: 120,
        }
    }
}

/// Token budget for inputs and retained history.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Tokenizer name: a tiktoken encoding or "approx".
    pub encoding: String,
    /// Largest single input accepted, in tokens.
    pub max_input_tokens: usize,
    /// History is pruned back under this many tokens after every turn.
    pub history_token_limit: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            encoding: "cl100k_base".to_string(),
            max_input_tokens: 1000,
            history_token_limit: 4000,
        }
    }
}

/// Slack escalation settings used in contact mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub channel: String,
    pub bot_token_env: String,
    pub api_base_url: String,
    pub thanks_message: String,
    /// Number of recent history entries attached to an inquiry.
    pub history_context: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            channel: "#support".to_string(),
            bot_token_env: "SLACK_BOT_TOKEN".to_string(),
            api_base_url: "https://slack.com/api".to_string(),
            thanks_message: constants::CONTACT_THANKS_MESSAGE.to_string(),
            history_context: 6,
        }
    }
}

/// Log output settings. Logs go to a file because the TUI owns the terminal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log directory; defaults to the data directory when unset.
    pub dir: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: true,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub contact: bool,
    pub verbose: bool,
}

impl Config {
    /// Load config from ~/.deskchat/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults when missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply CLI overrides in place.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(provider) = &overrides.provider {
            self.llm.provider = provider.clone();
        }
        if let Some(model) = &overrides.model {
            self.llm.model = model.clone();
        }
        if overrides.contact {
            self.app.contact_mode = ContactMode::On;
        }
        if overrides.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Base directory for user configuration.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".deskchat")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Path to the system prompt override.
    pub fn system_prompt_path() -> PathBuf {
        Self::config_dir().join("system.md")
    }

    /// Directory for transcripts and logs.
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deskchat")
    }

    /// Directory holding per-session transcripts.
    pub fn sessions_dir() -> PathBuf {
        Self::data_dir().join("sessions")
    }

    /// Directory the rolling log file is written to.
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .dir
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.budget.max_input_tokens, 1000);
        assert_eq!(config.budget.history_token_limit, 4000);
        assert_eq!(config.budget.encoding, "cl100k_base");
        assert_eq!(config.app.contact_mode, ContactMode::Off);
        assert_eq!(config.contact.bot_token_env, "SLACK_BOT_TOKEN");
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r##"
[app]
title = "Support Desk"
contact_mode = "on"

[llm]
provider = "ollama"
model = "llama3"
max_tokens = 2048

[budget]
encoding = "o200k_base"
max_input_tokens = 500
history_token_limit = 3000

[contact]
channel = "#helpdesk"
history_context = 2

[logging]
level = "debug"
json = false
"##;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.app.title, "Support Desk");
        assert_eq!(config.app.contact_mode, ContactMode::On);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.budget.encoding, "o200k_base");
        assert_eq!(config.budget.max_input_tokens, 500);
        assert_eq!(config.budget.history_token_limit, 3000);
        assert_eq!(config.contact.channel, "#helpdesk");
        assert_eq!(config.contact.history_context, 2);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[llm]
provider = "openrouter"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "openrouter");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.budget.max_input_tokens, 1000);
        assert_eq!(config.app.title, constants::APP_NAME);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[budget]\nmax_input_tokens = \"lots\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::default();
        config.apply(&Overrides {
            provider: Some("ollama".to_string()),
            model: Some("qwen2.5".to_string()),
            contact: true,
            verbose: true,
        });
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "qwen2.5");
        assert_eq!(config.app.contact_mode, ContactMode::On);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn explicit_log_dir_wins() {
        let mut config = Config::default();
        config.logging.dir = Some(PathBuf::from("/var/log/deskchat"));
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/deskchat"));
    }
}
