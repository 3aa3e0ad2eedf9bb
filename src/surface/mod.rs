//! Presentation seams.
//!
//! A surface captures one input per turn and renders history after every
//! mutation. The session core places no constraint on how either happens;
//! this trait is the whole contract.

mod terminal;

pub use terminal::TerminalSurface;

use crate::llm::ProviderError;
use crate::types::ChatMessage;

/// One user action, as delivered by a surface.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnRequest {
    /// Plain chat input to submit.
    Say(String),
    /// Swap generation settings for subsequent turns.
    Reconfigure { model: String, temperature: f32 },
    /// Re-render the full conversation.
    ShowHistory,
    /// End the session.
    Quit,
}

pub trait InteractionSurface {
    /// Block until the user produces an action. `None` means the input
    /// stream is closed and the session should end.
    fn read_turn(&mut self) -> std::io::Result<Option<TurnRequest>>;

    /// Render one message, role-distinguished.
    fn render(&mut self, message: &ChatMessage);

    /// Display a surfaced provider error alongside the apology reply.
    fn show_error(&mut self, error: &ProviderError);

    /// Out-of-band status line (reconfiguration confirmations and the like).
    fn notice(&mut self, text: &str);
}

/// Drive a session against a surface until the user quits or input closes.
///
/// One turn at a time: `submit` is awaited to completion before the next
/// action is read, which is the whole single-flight story.
pub async fn run_session<S: InteractionSurface>(
    session: &mut crate::session::ChatSession,
    surface: &mut S,
) -> std::io::Result<()> {
    while let Some(request) = surface.read_turn()? {
        match request {
            TurnRequest::Say(text) => match session.submit(&text).await {
                Ok(outcome) => {
                    if let Some(err) = &outcome.provider_error {
                        surface.show_error(err);
                    }
                    surface.render(&outcome.reply);
                }
                // Surfaces that pre-filter blanks never hit this; ones that
                // don't simply re-prompt.
                Err(crate::session::SubmitError::EmptyInput) => {}
            },
            TurnRequest::Reconfigure { model, temperature } => {
                match session.reconfigure(&model, temperature) {
                    Ok(()) => surface.notice(&format!(
                        "Model set to {model} with temp={temperature}"
                    )),
                    Err(err) => surface.show_error(&err),
                }
            }
            TurnRequest::ShowHistory => {
                for message in session.history() {
                    surface.render(message);
                }
            }
            TurnRequest::Quit => break,
        }
    }
    Ok(())
}
