use super::{LlmBackend, LlmResult, ProviderError};
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Hosted OpenAI-compatible chat completions with bearer auth.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    /// Fails with `MissingCredential` if the key is absent or blank, so a
    /// misconfigured session refuses turns before the first network call.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> LlmResult<Self> {
        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(ProviderError::MissingCredential(
                    "OPENAI_API_KEY is not set".into(),
                ));
            }
        };
        Ok(Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
            temperature,
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

pub(crate) fn parse_completion_body(body: &str) -> LlmResult<String> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("chat completion response: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::Malformed("chat completion response had no choices".into()))
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                temperature: self.temperature,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            parse_completion_body(&body)
        } else {
            Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn describe(&self) -> String {
        format!("openai {} @ {}", self.model, self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}}]}"#;
        assert_eq!(parse_completion_body(body).unwrap(), "Hello!");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let err = parse_completion_body(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn missing_key_fails_at_construction() {
        let err = OpenAiBackend::new(DEFAULT_ENDPOINT, None, DEFAULT_MODEL, 0.1).unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(_)));

        let err = OpenAiBackend::new(DEFAULT_ENDPOINT, Some("  ".into()), DEFAULT_MODEL, 0.1)
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(_)));
    }
}
