use super::{LlmBackend, LlmResult, ProviderError};
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemma3:4b";
pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";

/// Local Ollama `/api/chat`, non-streaming.
pub struct OllamaBackend {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OllamaBackend {
    pub fn new(host: &str, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/chat", host.trim_end_matches('/')),
            model: model.into(),
            temperature,
        }
    }
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

pub(crate) fn parse_chat_body(body: &str) -> LlmResult<String> {
    let parsed: OllamaChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("ollama response: {e}")))?;
    parsed
        .message
        .map(|msg| msg.content)
        .ok_or_else(|| ProviderError::Malformed("ollama response had no message".into()))
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&OllamaChatRequest {
                model: &self.model,
                messages,
                stream: false,
                options: OllamaOptions {
                    temperature: self.temperature,
                },
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            parse_chat_body(&body)
        } else {
            Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn describe(&self) -> String {
        format!("ollama {} @ {}", self.model, self.endpoint)
    }
}
