// src/models.rs

use chrono::{DateTime, Utc};
use std::fmt;

/// Model vendors known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Anthropic,
    DeepSeek,
    Ollama,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::DeepSeek => "DeepSeek",
            Provider::Ollama => "Ollama",
        }
    }

    /// Only locally hosted models run without a key.
    pub fn is_local(self) -> bool {
        matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Provider catalog, in display order.
pub const MODEL_CATALOG: &[(Provider, &[&str])] = &[
    (Provider::OpenAI, &["gpt-4o", "gpt-4o-mini", "o1-mini", "o3-mini"]),
    (Provider::Anthropic, &["claude-3-sonnet-latest", "claude-3-haiku-latest"]),
    (Provider::DeepSeek, &["deepseek-chat"]),
    (Provider::Ollama, &["llama3", "mistral", "gemma"]),
];

/// One entry of the model picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub value: &'static str,
    pub provider: Provider,
    pub label: String,
}

pub fn model_options() -> Vec<ModelOption> {
    MODEL_CATALOG
        .iter()
        .flat_map(|(provider, models)| {
            models.iter().map(move |model| ModelOption {
                value: *model,
                provider: *provider,
                label: format!("{} ({})", model, provider),
            })
        })
        .collect()
}

/// Returns `None` for models outside the catalog.
pub fn provider_for_model(model: &str) -> Option<Provider> {
    MODEL_CATALOG
        .iter()
        .find(|(_, models)| models.iter().any(|m| *m == model))
        .map(|(provider, _)| *provider)
}

/// Unknown models are treated like paid ones and need a key.
pub fn requires_api_key(model: &str) -> bool {
    !provider_for_model(model).is_some_and(Provider::is_local)
}

/// The `{model, apiKey}` pair the chat runs with. Replaced whole, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub model: String,
    pub api_key: String,
}

impl ValidatedConfig {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// The credential as sent on the wire, `None` when unset.
    pub fn api_key_param(&self) -> Option<String> {
        if self.api_key.is_empty() {
            None
        } else {
            Some(self.api_key.clone())
        }
    }
}

/// Logs details of each API call.
#[derive(Debug)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_lookup() {
        assert_eq!(provider_for_model("gpt-4o"), Some(Provider::OpenAI));
        assert_eq!(provider_for_model("claude-3-haiku-latest"), Some(Provider::Anthropic));
        assert_eq!(provider_for_model("deepseek-chat"), Some(Provider::DeepSeek));
        assert_eq!(provider_for_model("gemma"), Some(Provider::Ollama));
        assert_eq!(provider_for_model("gpt-5-turbo"), None);
    }

    #[test]
    fn test_only_local_models_skip_the_key() {
        for model in ["llama3", "mistral", "gemma"] {
            assert!(!requires_api_key(model), "{model} should run without a key");
        }
        for model in ["gpt-4o", "o3-mini", "claude-3-sonnet-latest", "deepseek-chat"] {
            assert!(requires_api_key(model), "{model} should need a key");
        }
    }

    #[test]
    fn test_unknown_model_requires_key() {
        assert!(requires_api_key("some-new-model"));
        assert!(requires_api_key(""));
    }

    #[test]
    fn test_model_options_order_and_labels() {
        let options = model_options();
        assert_eq!(options.len(), 10);
        assert_eq!(options[0].value, "gpt-4o");
        assert_eq!(options[0].label, "gpt-4o (OpenAI)");
        assert_eq!(options[9].label, "gemma (Ollama)");
    }

    #[test]
    fn test_api_key_param_is_none_when_blank() {
        assert_eq!(ValidatedConfig::new("llama3", "").api_key_param(), None);
        assert_eq!(
            ValidatedConfig::new("gpt-4o", "sk-1").api_key_param(),
            Some("sk-1".to_string())
        );
    }
}
