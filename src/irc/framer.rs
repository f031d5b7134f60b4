//! Inbound line framing.
//!
//! Accumulates raw bytes from the socket and yields complete CR LF terminated
//! lines. Bytes after the last terminator are kept for the next read, so a
//! protocol line split across two reads is reassembled instead of dropped.
//!
//! Lines are limited to 512 bytes including the terminator (IRC standard).

use bytes::{Buf, BytesMut};

use crate::error::FrameError;

const TERMINATOR: &[u8] = b"\r\n";

/// Maximum line length, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Persistent line buffer for one connection.
#[derive(Debug)]
pub struct LineFramer {
    buf: BytesMut,
    /// Index of next byte to check for a terminator
    next_index: usize,
    max_len: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            next_index: 0,
            max_len,
        }
    }

    /// Append `chunk` and return every line it completes, in arrival order.
    ///
    /// Terminators are stripped and empty lines are discarded. Any trailing
    /// partial line stays buffered. A line, complete or partial, longer than
    /// the limit is an error; the framer is not usable afterwards.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, FrameError> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        // A CR at the end of the previous chunk may pair with an LF at the
        // start of this one.
        let mut from = self.next_index.saturating_sub(1);
        while let Some(offset) = self.buf[from..]
            .windows(TERMINATOR.len())
            .position(|w| w == TERMINATOR)
        {
            let line = self.buf.split_to(from + offset);
            self.buf.advance(TERMINATOR.len());
            from = 0;

            if line.len() + TERMINATOR.len() > self.max_len {
                return Err(FrameError::LineTooLong {
                    actual: line.len() + TERMINATOR.len(),
                    limit: self.max_len,
                });
            }

            if !line.is_empty() {
                lines.push(String::from_utf8_lossy(&line).into_owned());
            }
        }
        self.next_index = self.buf.len();

        // Check if partial line already exceeds limit
        if self.buf.len() > self.max_len {
            return Err(FrameError::LineTooLong {
                actual: self.buf.len(),
                limit: self.max_len,
            });
        }

        Ok(lines)
    }

    /// Number of buffered bytes not yet part of a complete line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
