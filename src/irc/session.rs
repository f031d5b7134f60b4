//! Connection loop: read bytes, frame, parse, dispatch, write replies.

use crate::irc::dispatcher::Dispatcher;
use crate::irc::framer::LineFramer;
use crate::irc::message::ParsedMessage;
use crate::logging::WireLog;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const READ_BUF_SIZE: usize = 4096;

/// Why the session ended.
#[derive(Debug)]
pub enum CloseReason {
    /// The server closed the stream.
    Graceful,
    /// A read or write failed, or the peer sent an oversized line.
    Error(io::Error),
}

impl CloseReason {
    pub fn had_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Owns the stream for one connection and drives the dispatcher from it.
pub struct Session<S, L> {
    stream: S,
    framer: LineFramer,
    dispatcher: Dispatcher,
    log: L,
}

impl<S, L> Session<S, L>
where
    S: AsyncRead + AsyncWrite + Unpin,
    L: WireLog,
{
    pub fn new(stream: S, dispatcher: Dispatcher, log: L) -> Self {
        Self {
            stream,
            framer: LineFramer::new(),
            dispatcher,
            log,
        }
    }

    /// Run until the stream closes. There is no timeout; a silent server
    /// keeps the session waiting.
    pub async fn run(&mut self) -> CloseReason {
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let n = match self.stream.read(&mut buf).await {
                Ok(0) => return CloseReason::Graceful,
                Ok(n) => n,
                Err(e) => return CloseReason::Error(e),
            };
            if let Err(e) = self.process_chunk(&buf[..n]).await {
                return CloseReason::Error(e);
            }
        }
    }

    /// Handle every line completed by `chunk`, then flush all replies
    /// before returning.
    async fn process_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let lines = self.framer.push(chunk).map_err(|e| {
            warn!(error = %e, "Dropping connection");
            io::Error::new(io::ErrorKind::InvalidData, e)
        })?;
        for line in lines {
            self.log.inbound(&line);
            let Some(message) = ParsedMessage::parse(&line) else {
                continue;
            };
            for reply in self.dispatcher.dispatch(&message) {
                let raw = reply.to_line();
                self.log.outbound(&raw);
                self.stream.write_all(raw.as_bytes()).await?;
            }
        }
        if self.framer.pending() > 0 {
            debug!(pending = self.framer.pending(), "Partial line buffered");
        }
        self.stream.flush().await
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn into_log(self) -> L {
        self.log
    }
}
