use anyhow::Context;
use wren::surface::{self, TerminalSurface};
use wren::{ChatSession, LlmConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win either way.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = LlmConfig::from_env();
    let mut session = ChatSession::new(config).context("failed to configure LLM backend")?;

    let mut terminal = TerminalSurface::stdio();
    terminal.banner(&session.backend_description())?;
    surface::run_session(&mut session, &mut terminal).await?;

    Ok(())
}
