// ABOUTME: System prompt builder: compiled-in default with file-based overrides.
// ABOUTME: ~/.deskchat/system.md replaces the base; .deskchat.md in the cwd is appended.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Compiled-in default prompt.
const DEFAULT_BASE: &str = include_str!("prompts/assistant.md");

/// Reads a file if it exists, returning None otherwise.
pub fn read_if_exists(path: &Path) -> Option<String> {
    if path.exists() {
        fs::read_to_string(path).ok()
    } else {
        None
    }
}

/// Assembles the system prompt from a base layer and an optional local layer.
#[derive(Debug, Clone)]
pub struct SystemPromptBuilder {
    pub base: String,
    pub local: Option<String>,
}

impl SystemPromptBuilder {
    /// Creates a new builder loaded with the compiled-in default.
    pub fn new() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            local: None,
        }
    }

    /// Replace the base layer with the file at `path`, if present.
    pub fn load_override(&mut self, path: &Path) -> &mut Self {
        if let Some(content) = read_if_exists(path) {
            self.base = content;
        }
        self
    }

    /// Use the local layer from the file at `path`, if present.
    pub fn load_local(&mut self, path: &Path) -> &mut Self {
        self.local = read_if_exists(path);
        self
    }

    /// Load both layers from their standard locations.
    pub fn load_standard(&mut self) -> &mut Self {
        self.load_override(&Config::system_prompt_path())
            .load_local(&PathBuf::from(".deskchat.md"))
    }

    /// Concatenates all non-empty layers separated by `"\n\n"`.
    pub fn build(&self) -> String {
        [Some(self.base.trim()), self.local.as_deref().map(str::trim)]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for SystemPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contains_base_content() {
        let prompt = SystemPromptBuilder::new().build();
        assert!(prompt.contains("customer support assistant"));
    }

    #[test]
    fn override_replaces_base() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("system.md");
        fs::write(&path, "You are a pirate support agent.").unwrap();

        let prompt = SystemPromptBuilder::new().load_override(&path).build();
        assert_eq!(prompt, "You are a pirate support agent.");
    }

    #[test]
    fn missing_override_keeps_default() {
        let tmp = tempfile::tempdir().unwrap();
        let prompt = SystemPromptBuilder::new()
            .load_override(&tmp.path().join("missing.md"))
            .build();
        assert!(prompt.contains("customer support assistant"));
    }

    #[test]
    fn local_layer_appended_after_base() {
        let mut builder = SystemPromptBuilder::new();
        builder.local = Some("Our store closes at 6pm.".to_string());
        let prompt = builder.build();
        let local_pos = prompt.find("Our store closes").unwrap();
        let base_pos = prompt.find("customer support assistant").unwrap();
        assert!(local_pos > base_pos);
        assert!(prompt.contains("\n\nOur store closes"));
    }

    #[test]
    fn empty_layers_are_skipped() {
        let builder = SystemPromptBuilder {
            base: String::new(),
            local: Some("only local".to_string()),
        };
        assert_eq!(builder.build(), "only local");
    }
}
