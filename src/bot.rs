//! Ties configuration, transport, and session together for one connection.

use crate::config::ConnectionConfig;
use crate::error::ConnectionError;
use crate::irc::connection::connect;
use crate::irc::dispatcher::Dispatcher;
use crate::irc::session::{CloseReason, Session};
use crate::logging::WireLog;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// One bot, one server, one channel. Each call to [`Bot::run`] is a fresh
/// connection with fresh session state.
pub struct Bot {
    config: ConnectionConfig,
}

impl Bot {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Connect and serve until the server closes the connection.
    pub async fn run<L: WireLog>(&self, log: L) -> Result<CloseReason, ConnectionError> {
        info!(address = %self.config.address(), tls = self.config.tls, "Connecting");
        let transport = connect(&self.config).await?;
        let secure = transport.is_secure();
        Ok(self.serve(transport, secure, log).await)
    }

    /// Drive an already established stream.
    pub async fn serve<S, L>(&self, stream: S, secure: bool, mut log: L) -> CloseReason
    where
        S: AsyncRead + AsyncWrite + Unpin,
        L: WireLog,
    {
        log.status(&connected_text(&self.config, secure));

        let mut session = Session::new(stream, Dispatcher::new(&self.config), log);
        let reason = session.run().await;

        if let CloseReason::Error(e) = &reason {
            warn!(error = %e, "Connection lost");
        }
        debug!(phase = ?session.dispatcher().state().phase(), "Session ended");
        session.into_log().status(exiting_text(&reason));
        reason
    }
}

fn connected_text(config: &ConnectionConfig, secure: bool) -> String {
    let prefix = if secure { "Securely connected" } else { "Connected" };
    format!("{} to {}", prefix, config.address())
}

fn exiting_text(reason: &CloseReason) -> &'static str {
    if reason.had_error() {
        "Exiting due to transmission error."
    } else {
        "Exiting"
    }
}
