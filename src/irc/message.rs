//! Inbound protocol line parser.
//!
//! Splits one framed line into its optional prefix, command, and the verbatim
//! parameter remainder. The prefix is kept whole (including the leading `:`);
//! commands that care about the originator decompose it themselves.

/// Marks the first token of a line as a prefix.
pub const PREFIX_SENTINEL: char = ':';

/// A single parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub prefix: Option<String>,
    pub command: String,
    pub params: String,
}

impl ParsedMessage {
    /// Parse a framed line into its components.
    ///
    /// Returns `None` for an empty line. Tokens are separated by single
    /// spaces and the parameter remainder is rejoined with single spaces, so
    /// a trailing argument (`:some text`) survives unchanged.
    pub fn parse(line: &str) -> Option<Self> {
        if line.is_empty() {
            return None;
        }

        let mut pieces = line.split(' ');
        let first = pieces.next()?;

        let (prefix, command) = if first.starts_with(PREFIX_SENTINEL) {
            (Some(first.to_string()), pieces.next().unwrap_or_default())
        } else {
            (None, first)
        };

        let params = pieces.collect::<Vec<_>>().join(" ");
        Some(Self {
            prefix,
            command: command.to_string(),
            params,
        })
    }

    /// Originator identity: the prefix without its sentinel.
    pub fn source(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.strip_prefix(PREFIX_SENTINEL).unwrap_or(p))
    }

    /// Nickname portion of the originator (`nick` in `nick!user@host`).
    pub fn source_nick(&self) -> Option<&str> {
        self.source()
            .map(|s| s.split(['!', '@']).next().unwrap_or(s))
    }
}
