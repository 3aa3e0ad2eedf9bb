use super::{LlmBackend, LlmResult, ProviderError};
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Arbitrary self-hosted endpoint speaking the minimal
/// `{ messages: [{role, content}, ...] }` -> `{ content }` JSON shape.
pub struct CustomBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CustomBackend {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    content: String,
}

#[async_trait]
impl LlmBackend for CustomBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { messages });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed: ChatResponse = serde_json::from_str(&body)
                .map_err(|e| ProviderError::Malformed(format!("custom endpoint response: {e}")))?;
            Ok(parsed.content)
        } else {
            Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn describe(&self) -> String {
        format!("custom endpoint @ {}", self.endpoint)
    }
}
