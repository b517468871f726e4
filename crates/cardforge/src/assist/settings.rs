//! Assist provider settings, persisted as a JSON file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::generator::FieldGenerator;
use super::mock::MockGenerator;
use super::openai::OpenAiCompatibleGenerator;
use crate::error::{CardError, Result};

/// Which chat-completion service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Ollama,
    #[serde(alias = "lm_studio")]
    LmStudio,
    Mock,
}

impl ProviderKind {
    /// Base URL used when the settings leave it blank.
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Ollama => "http://localhost:11434/v1",
            ProviderKind::LmStudio => "http://localhost:1234/v1",
            ProviderKind::Mock => "",
        }
    }

    /// Model used when the settings leave it blank.
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Ollama => "llama3.2",
            ProviderKind::LmStudio => "local-model",
            ProviderKind::Mock => "mock",
        }
    }

    /// Local servers run without a key.
    pub fn requires_api_key(self) -> bool {
        matches!(self, ProviderKind::OpenAi)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::LmStudio => write!(f, "lmstudio"),
            ProviderKind::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            "lmstudio" => Ok(ProviderKind::LmStudio),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err(CardError::Config(format!(
                "Unknown provider '{}' (expected openai, ollama, lmstudio or mock)",
                s
            ))),
        }
    }
}

/// Settings for the assist provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    pub provider: ProviderKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the provider's default base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Overrides the provider's default model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature (0.0-2.0).
    pub temperature: f64,

    /// Maximum tokens in the reply.
    pub max_tokens: usize,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            api_key: None,
            base_url: None,
            model: None,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl AssistSettings {
    /// Base URL in effect, without a trailing slash.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Model in effect.
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.provider.default_model())
    }

    /// API key, if a non-blank one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Build the generator these settings describe.
    pub fn build_generator(&self) -> Result<Box<dyn FieldGenerator>> {
        if self.provider.requires_api_key() && self.api_key().is_none() {
            return Err(CardError::Config(format!(
                "The {} provider needs an API key",
                self.provider
            )));
        }

        debug!(provider = %self.provider, model = self.effective_model(), "building generator");
        match self.provider {
            ProviderKind::Mock => Ok(Box::new(MockGenerator::new())),
            _ => Ok(Box::new(OpenAiCompatibleGenerator::from_settings(self)?)),
        }
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            CardError::Persistence(format!(
                "Failed to open settings '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            CardError::Persistence(format!(
                "Failed to parse settings '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CardError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            CardError::Persistence(format!(
                "Failed to create settings '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            CardError::Persistence(format!("Failed to serialize settings: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = AssistSettings::default();
        assert_eq!(settings.provider, ProviderKind::OpenAi);
        assert_eq!(settings.effective_base_url(), "https://api.openai.com/v1");
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn test_key_required_only_for_openai() {
        let missing = AssistSettings::default();
        assert!(matches!(missing.build_generator(), Err(CardError::Config(_))));

        let blank = AssistSettings {
            api_key: Some("   ".to_string()),
            ..AssistSettings::default()
        };
        assert!(blank.build_generator().is_err());

        for provider in [ProviderKind::Ollama, ProviderKind::LmStudio, ProviderKind::Mock] {
            let settings = AssistSettings {
                provider,
                ..AssistSettings::default()
            };
            assert!(settings.build_generator().is_ok(), "{}", provider);
        }
    }

    #[test]
    fn test_base_url_override() {
        let settings = AssistSettings {
            provider: ProviderKind::Ollama,
            base_url: Some("http://gpu-box:11434/v1/".to_string()),
            ..AssistSettings::default()
        };
        assert_eq!(settings.effective_base_url(), "http://gpu-box:11434/v1");
        assert_eq!(settings.effective_model(), "llama3.2");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("LM-Studio".parse::<ProviderKind>().unwrap(), ProviderKind::LmStudio);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf/settings.json");

        let settings = AssistSettings {
            provider: ProviderKind::LmStudio,
            model: Some("qwen2.5-7b".to_string()),
            temperature: 0.2,
            ..AssistSettings::default()
        };
        settings.save(&path).unwrap();

        assert_eq!(AssistSettings::load(&path).unwrap(), settings);
        assert_eq!(
            AssistSettings::load_or_default(dir.path().join("missing.json")).unwrap(),
            AssistSettings::default()
        );
    }

    #[test]
    fn test_partial_settings_file() {
        let settings: AssistSettings = serde_json::from_str(r#"{"provider":"ollama"}"#).unwrap();
        assert_eq!(settings.provider, ProviderKind::Ollama);
        assert_eq!(settings.max_tokens, 1024);
    }
}
