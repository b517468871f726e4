//! OpenAI-compatible chat-completion provider.
//!
//! OpenAI, Ollama and LM Studio all serve `/chat/completions` with the same
//! request and response shape; only the base URL and the key differ.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::cancel::CancellationToken;
use super::generator::{FieldGenerator, GenerationRequest};
use super::settings::{AssistSettings, ProviderKind};
use crate::error::{CardError, Result};

/// Chat-completion provider for any OpenAI-compatible server.
pub struct OpenAiCompatibleGenerator {
    client: Client,
    provider: ProviderKind,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    max_tokens: usize,
}

impl OpenAiCompatibleGenerator {
    /// Create a generator from assist settings.
    pub fn from_settings(settings: &AssistSettings) -> Result<Self> {
        let timeout = match settings.provider {
            ProviderKind::OpenAi => Duration::from_secs(60),
            // Local models can be slower
            _ => Duration::from_secs(180),
        };
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CardError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            provider: settings.provider,
            endpoint: format!("{}/chat/completions", settings.effective_base_url()),
            api_key: settings.api_key().map(str::to_string),
            model: settings.effective_model().to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    /// The full chat-completions URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| CardError::Config(format!("Invalid API key: {}", e)))?,
            );
        }
        Ok(headers)
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": messages
        })
    }
}

impl FieldGenerator for OpenAiCompatibleGenerator {
    fn generate(&self, request: &GenerationRequest, token: &CancellationToken) -> Result<String> {
        token.check()?;

        debug!(endpoint = %self.endpoint, model = %self.model, "sending generation request");
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&self.request_body(request))
            .send()
            .map_err(|e| CardError::Generation(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(CardError::Generation(format!(
                "{} API error ({}): {}",
                self.provider, status, error_text
            )));
        }

        let api_response: ChatResponse = response
            .json()
            .map_err(|e| CardError::Generation(format!("Failed to parse API response: {}", e)))?;

        // A reply that lands after cancellation is dropped.
        token.check()?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| CardError::Generation(format!("Empty reply from {}", self.provider)))?;

        info!(provider = %self.provider, chars = text.chars().count(), "generation finished");
        Ok(text)
    }

    fn name(&self) -> &str {
        match self.provider {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Ollama => "Ollama",
            ProviderKind::LmStudio => "LM Studio",
            ProviderKind::Mock => "Mock",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> OpenAiCompatibleGenerator {
        let settings = AssistSettings {
            provider: ProviderKind::LmStudio,
            ..AssistSettings::default()
        };
        OpenAiCompatibleGenerator::from_settings(&settings).unwrap()
    }

    #[test]
    fn test_endpoint_per_provider() {
        assert_eq!(local().endpoint(), "http://localhost:1234/v1/chat/completions");
        assert_eq!(local().name(), "LM Studio");
    }

    #[test]
    fn test_request_body() {
        let request = GenerationRequest::new("Describe her.").with_system("You write cards.");
        let body = local().request_body(&request);

        assert_eq!(body["model"], "local-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Describe her.");
    }

    #[test]
    fn test_cancelled_before_send() {
        let token = CancellationToken::new();
        token.cancel();
        let err = local()
            .generate(&GenerationRequest::new("x"), &token)
            .unwrap_err();
        assert!(matches!(err, CardError::Cancelled));
    }

    #[test]
    fn test_parse_response_shape() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":" hi "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some(" hi "));
    }
}
