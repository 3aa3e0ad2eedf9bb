//! LLM backends.
//!
//! Every provider implements [`LlmBackend`]: one blocking chat-completion
//! call over the full ordered message list, returning the reply text or a
//! [`ProviderError`]. No retries, no streaming — the session layer decides
//! what to do with a failure.

pub mod custom;
pub mod ollama;
pub mod openai;

pub use custom::CustomBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use crate::types::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

/// Any non-success outcome of a completion call.
///
/// A credential that is absent fails fast as `MissingCredential` when the
/// backend is constructed; a credential that is present but rejected by the
/// provider comes back later as `Api` with the provider's own status/body.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

pub type LlmResult<T> = Result<T, ProviderError>;

/// A chat-completion endpoint. The payload is the entire session history,
/// verbatim and in order; implementations must not reorder or truncate it.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String>;

    /// Human-readable identity for logs and the terminal banner.
    fn describe(&self) -> String;
}
