//! The chat-session state machine.
//!
//! A session owns the ordered conversation history and drives the turn
//! protocol: append the user message, hand the entire history to the backend,
//! append the reply (or the sentinel apology on failure), return to idle.
//! History is append-only; the surface only ever reads snapshots.

use crate::config::LlmConfig;
use crate::llm::{LlmBackend, ProviderError};
use crate::types::ChatMessage;
use thiserror::Error;
use tracing::{debug, warn};

/// Seeded as the first history entry of every session.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful chatbot. Be concise and accurate.";

/// Appended in place of a reply when the completion call fails, so a
/// provider hiccup never breaks the conversation flow or leaks raw error
/// text into the transcript.
pub const APOLOGY: &str = "Sorry, I couldn't generate a response.";

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Blank or whitespace-only input. History is untouched and the backend
    /// was never invoked.
    #[error("empty input")]
    EmptyInput,
}

/// What a completed turn produced: the assistant message that was appended,
/// plus the underlying provider error when that message is the apology.
#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: ChatMessage,
    pub provider_error: Option<ProviderError>,
}

impl TurnOutcome {
    pub fn is_failure(&self) -> bool {
        self.provider_error.is_some()
    }
}

pub struct ChatSession {
    history: Vec<ChatMessage>,
    client: Box<dyn LlmBackend>,
    config: LlmConfig,
}

impl ChatSession {
    /// Create a session with the default system preamble.
    pub fn new(config: LlmConfig) -> Result<Self, ProviderError> {
        Self::with_preamble(config, SYSTEM_PREAMBLE)
    }

    pub fn with_preamble(
        config: LlmConfig,
        preamble: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = config.client()?;
        Ok(Self::with_client(config, client, preamble))
    }

    /// Inject a pre-built backend instead of building one from the config.
    /// `reconfigure` still rebuilds from the config afterwards.
    pub fn with_client(
        config: LlmConfig,
        client: Box<dyn LlmBackend>,
        preamble: impl Into<String>,
    ) -> Self {
        Self {
            history: vec![ChatMessage::system(preamble)],
            client,
            config,
        }
    }

    /// Read-only view of the conversation so far, system preamble first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn backend_description(&self) -> String {
        self.client.describe()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn temperature(&self) -> f32 {
        self.config.temperature
    }

    /// Run one full turn.
    ///
    /// The entire history — system preamble, every prior turn, and the new
    /// user message — is sent to the backend verbatim, with no truncation or
    /// windowing. Returns only after the completion call resolves, so at most
    /// one call is ever in flight per session (`&mut self` makes pipelining
    /// impossible to express).
    ///
    /// On provider failure the turn still completes: the apology sentinel is
    /// appended instead of a reply and the error rides along in the outcome
    /// for the surface to display. History grows by exactly two messages per
    /// successful submit either way.
    pub async fn submit(&mut self, input: &str) -> Result<TurnOutcome, SubmitError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        self.history.push(ChatMessage::user(text));
        debug!(
            messages = self.history.len(),
            backend = %self.client.describe(),
            "dispatching completion request"
        );

        let outcome = match self.client.complete(&self.history).await {
            Ok(reply) => TurnOutcome {
                reply: ChatMessage::assistant(reply),
                provider_error: None,
            },
            Err(err) => {
                warn!(error = %err, "completion failed, substituting apology");
                TurnOutcome {
                    reply: ChatMessage::assistant(APOLOGY),
                    provider_error: Some(err),
                }
            }
        };

        self.history.push(outcome.reply.clone());
        Ok(outcome)
    }

    /// Swap generation settings for subsequent turns. Recorded history is
    /// untouched. Cannot race a completion call: both paths need `&mut self`.
    pub fn reconfigure(
        &mut self,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<(), ProviderError> {
        let config = self.config.with_generation(model, temperature);
        self.client = config.client()?;
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use crate::llm::LlmResult;
    use crate::types::Role;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Scripted backend: pops canned results and records every payload it
    /// was handed.
    struct StubBackend {
        replies: Mutex<Vec<LlmResult<String>>>,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubBackend {
        fn new(replies: Vec<LlmResult<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for Arc<StubBackend> {
        async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            self.replies.lock().unwrap().remove(0)
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn test_config() -> LlmConfig {
        LlmConfig {
            provider: Provider::Ollama,
            model: "gemma3:4b".into(),
            temperature: 0.1,
            api_key: None,
            endpoint: None,
        }
    }

    fn session_with(replies: Vec<LlmResult<String>>) -> (ChatSession, Arc<StubBackend>) {
        let stub = Arc::new(StubBackend::new(replies));
        let session =
            ChatSession::with_client(test_config(), Box::new(stub.clone()), SYSTEM_PREAMBLE);
        (session, stub)
    }

    #[tokio::test]
    async fn fresh_session_seeds_system_preamble() {
        let (session, _) = session_with(vec![]);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, Role::System);
        assert_eq!(session.history()[0].content, SYSTEM_PREAMBLE);
    }

    #[tokio::test]
    async fn successful_turn_appends_user_and_assistant() {
        let (mut session, _) = session_with(vec![Ok("Hi there".into())]);
        let outcome = session.submit("Hello").await.unwrap();

        assert!(!outcome.is_failure());
        assert_eq!(outcome.reply, ChatMessage::assistant("Hi there"));
        assert_eq!(
            session.history(),
            &[
                ChatMessage::system(SYSTEM_PREAMBLE),
                ChatMessage::user("Hello"),
                ChatMessage::assistant("Hi there"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let (mut session, stub) = session_with(vec![]);

        assert!(matches!(
            session.submit("").await,
            Err(SubmitError::EmptyInput)
        ));
        assert!(matches!(
            session.submit("   ").await,
            Err(SubmitError::EmptyInput)
        ));
        assert_eq!(session.history().len(), 1);
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_completion_appends_apology_and_surfaces_error() {
        let (mut session, _) = session_with(vec![Err(ProviderError::Api {
            status: 504,
            body: "timeout".into(),
        })]);
        let outcome = session.submit("ping").await.unwrap();

        assert!(outcome.is_failure());
        assert_eq!(outcome.reply.content, APOLOGY);
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[2].content, APOLOGY);
        let err = outcome.provider_error.unwrap();
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn roles_alternate_across_turns() {
        let (mut session, _) = session_with(vec![Ok("first".into()), Ok("second".into())]);
        session.submit("one").await.unwrap();
        session.submit("two").await.unwrap();

        let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );
    }

    #[tokio::test]
    async fn backend_receives_full_history_each_turn() {
        let (mut session, stub) = session_with(vec![Ok("a".into()), Ok("b".into())]);
        session.submit("one").await.unwrap();
        session.submit("two").await.unwrap();

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        // Payload for turn N is the history exactly as of the turn-N user
        // message, nothing windowed away.
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[1].len(), 4);
        assert_eq!(calls[1][..2], calls[0][..]);
        assert_eq!(calls[1][3], ChatMessage::user("two"));
    }

    #[tokio::test]
    async fn history_keeps_growing_after_a_failure() {
        let (mut session, _) = session_with(vec![
            Err(ProviderError::Malformed("bad json".into())),
            Ok("recovered".into()),
        ]);
        session.submit("first").await.unwrap();
        let outcome = session.submit("second").await.unwrap();

        assert!(!outcome.is_failure());
        assert_eq!(session.history().len(), 5);
        assert_eq!(session.history()[2].content, APOLOGY);
        assert_eq!(session.history()[4].content, "recovered");
    }

    #[tokio::test]
    async fn reconfigure_keeps_history_and_swaps_settings() {
        let (mut session, _) = session_with(vec![Ok("hi".into())]);
        session.submit("hello").await.unwrap();
        let before = session.history().to_vec();

        session.reconfigure("llama3.1:latest", 0.9).unwrap();

        assert_eq!(session.history(), &before[..]);
        assert_eq!(session.model(), "llama3.1:latest");
        assert_eq!(session.temperature(), 0.9);
    }
}
