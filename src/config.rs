// Run configuration for namewise
// Built from CLI flags, then passed explicitly into the pipeline

use crate::llm::Provider;
use crate::prompt::StylePolicy;
use std::time::Duration;

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3:8b";

/// Settings for one rename request
#[derive(Debug, Clone)]
pub struct Config {
    /// Which model command to shell out to
    pub provider: Provider,

    /// Model name passed to `ollama run`
    pub ollama_model: String,

    /// Model calls before giving up on a malformed answer
    pub max_attempts: u32,

    /// Constant pause before each retry
    pub retry_delay: Duration,

    /// Output-shape instructions for the model
    pub style_policy: StylePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
            style_policy: StylePolicy::default(),
        }
    }
}

impl Config {
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_ollama_model(mut self, model: impl Into<String>) -> Self {
        self.ollama_model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.ollama_model, "llama3:8b");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.style_policy, StylePolicy::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::default()
            .with_provider(Provider::Claude)
            .with_ollama_model("mistral");
        assert_eq!(config.provider, Provider::Claude);
        assert_eq!(config.ollama_model, "mistral");
        assert_eq!(config.max_attempts, 3);
    }
}
