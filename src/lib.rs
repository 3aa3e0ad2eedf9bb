//! wren — a small chat companion for local and hosted LLMs.
//!
//! The core is [`session::ChatSession`], which owns an append-only
//! conversation history and drives one turn at a time through a pluggable
//! [`llm::LlmBackend`]. Presentation lives behind
//! [`surface::InteractionSurface`]; the bundled [`surface::TerminalSurface`]
//! is a plain stdin/stdout loop.

pub mod config;
pub mod llm;
pub mod session;
pub mod surface;
pub mod types;

pub use config::LlmConfig;
pub use llm::{LlmBackend, ProviderError};
pub use session::{ChatSession, SubmitError, TurnOutcome};
pub use types::{ChatMessage, Role};
