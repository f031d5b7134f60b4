mod bot;
mod config;
mod error;
mod irc;
mod logging;

use crate::bot::Bot;
use crate::logging::TranscriptLogger;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Optional config path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = config::load_config(config_path.as_deref())?;

    info!(
        host = %cfg.server.host,
        port = cfg.server.port,
        nickname = %cfg.server.nickname,
        channel = %cfg.server.channel,
        "Starting crabbot"
    );

    let transcript = TranscriptLogger::new(&cfg.logging, &cfg.server.host);
    let bot = Bot::new(cfg.server);
    let reason = bot
        .run(transcript)
        .await
        .with_context(|| format!("Could not connect to {}", bot.config().address()))
        .inspect_err(|e| error!("{:#}", e))?;

    info!(had_error = reason.had_error(), "Session closed");
    Ok(())
}
