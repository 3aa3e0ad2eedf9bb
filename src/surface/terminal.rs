use super::{InteractionSurface, TurnRequest};
use crate::llm::ProviderError;
use crate::types::{ChatMessage, Role};
use std::io::{self, BufRead, Write};

const SEPARATOR_WIDTH: usize = 80;

/// Blocking stdin/stdout chat loop.
pub struct TerminalSurface<R, W> {
    input: R,
    output: W,
}

impl TerminalSurface<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> TerminalSurface<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn banner(&mut self, backend: &str) -> io::Result<()> {
        writeln!(self.output, "wren chat — {backend}")?;
        writeln!(
            self.output,
            "Type 'exit' to quit, /model <name> [temperature] to switch models, /history to replay.\n"
        )
    }
}

/// Map one raw input line to a turn request. Blank lines map to nothing at
/// all, which is how empty submissions stay a no-op end to end.
pub fn parse_line(raw: &str) -> Option<TurnRequest> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Some(TurnRequest::Quit);
    }
    if line == "/history" {
        return Some(TurnRequest::ShowHistory);
    }
    if line == "/model" {
        return None;
    }
    if let Some(rest) = line.strip_prefix("/model ") {
        let mut parts = rest.split_whitespace();
        let model = parts.next()?.to_string();
        let temperature = parts
            .next()
            .and_then(|raw| raw.parse::<f32>().ok())
            .unwrap_or(crate::config::DEFAULT_TEMPERATURE);
        return Some(TurnRequest::Reconfigure { model, temperature });
    }
    Some(TurnRequest::Say(line.to_string()))
}

impl<R: BufRead, W: Write> InteractionSurface for TerminalSurface<R, W> {
    fn read_turn(&mut self) -> io::Result<Option<TurnRequest>> {
        loop {
            write!(self.output, "You: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if let Some(request) = parse_line(&line) {
                return Ok(Some(request));
            }
            // blank line: prompt again without advancing the session
        }
    }

    fn render(&mut self, message: &ChatMessage) {
        let prefix = match message.role {
            Role::System => "System",
            Role::User => "You",
            Role::Assistant => "Bot",
        };
        let _ = writeln!(self.output, "{prefix}: {}\n", message.content);
        if message.role == Role::Assistant {
            let _ = writeln!(self.output, "{}", "-".repeat(SEPARATOR_WIDTH));
        }
    }

    fn show_error(&mut self, error: &ProviderError) {
        let _ = writeln!(io::stderr(), "completion failed: {error}");
    }

    fn notice(&mut self, text: &str) {
        let _ = writeln!(self.output, "{text}\n");
    }
}
