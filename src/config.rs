//! Provider selection and generation settings, resolved from the environment.

use crate::llm::{self, CustomBackend, LlmBackend, LlmResult, OllamaBackend, OpenAiBackend};
use std::env;

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    Custom,
    OpenAi,
    Ollama,
}

/// Everything needed to build (and rebuild) a backend. The session keeps its
/// copy so `reconfigure` can swap model/temperature without re-reading the
/// environment.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

impl LlmConfig {
    /// Resolve from environment variables.
    ///
    /// Priority order:
    /// 1. `LLM_ENDPOINT` → custom backend (optional `LLM_API_KEY`)
    /// 2. `OPENAI_API_KEY` → hosted OpenAI-compatible backend
    /// 3. otherwise → local Ollama
    pub fn from_env() -> Self {
        let temperature = env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|raw| raw.parse::<f32>().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);

        if let Ok(endpoint) = env::var("LLM_ENDPOINT") {
            return Self {
                provider: Provider::Custom,
                model: env::var("LLM_MODEL").unwrap_or_default(),
                temperature,
                api_key: env::var("LLM_API_KEY").ok(),
                endpoint: Some(endpoint),
            }
            .clamped();
        }

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            return Self {
                provider: Provider::OpenAi,
                model: env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| llm::openai::DEFAULT_MODEL.to_string()),
                temperature,
                api_key: Some(key),
                endpoint: env::var("OPENAI_ENDPOINT").ok(),
            }
            .clamped();
        }

        Self {
            provider: Provider::Ollama,
            model: env::var("LLM_MODEL").unwrap_or_else(|_| llm::ollama::DEFAULT_MODEL.to_string()),
            temperature,
            api_key: None,
            endpoint: env::var("OLLAMA_HOST").ok(),
        }
        .clamped()
    }

    /// Same provider and credentials, new generation settings.
    pub fn with_generation(&self, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
            ..self.clone()
        }
        .clamped()
    }

    fn clamped(mut self) -> Self {
        self.temperature = self.temperature.clamp(0.0, 1.0);
        self
    }

    /// Build the backend this configuration describes.
    pub fn client(&self) -> LlmResult<Box<dyn LlmBackend>> {
        match self.provider {
            Provider::Custom => {
                let endpoint = self.endpoint.clone().unwrap_or_default();
                Ok(Box::new(CustomBackend::new(endpoint, self.api_key.clone())))
            }
            Provider::OpenAi => {
                let endpoint = self
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| llm::openai::DEFAULT_ENDPOINT.to_string());
                Ok(Box::new(OpenAiBackend::new(
                    endpoint,
                    self.api_key.clone(),
                    &self.model,
                    self.temperature,
                )?))
            }
            Provider::Ollama => {
                let host = self
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| llm::ollama::DEFAULT_HOST.to_string());
                Ok(Box::new(OllamaBackend::new(
                    &host,
                    &self.model,
                    self.temperature,
                )))
            }
        }
    }
}
