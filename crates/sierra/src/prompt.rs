use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Prompt text loaded once at process start and passed by value into
/// constructors; there is no shared mutable prompt state.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    pub main_system_prompt: String,
}

impl PromptConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse prompt config {}", path.display()))
    }
}
