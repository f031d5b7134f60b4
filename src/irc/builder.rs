//! Outbound protocol line builder.

use std::fmt;

/// Realname sent during user registration.
pub const REALNAME: &str = "nodebot";

/// A structured outbound record produced by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Option<String>,
}

impl OutboundMessage {
    pub fn new(command: &str, params: Option<String>) -> Self {
        Self {
            prefix: None,
            command: command.to_string(),
            params,
        }
    }

    pub fn nick(nickname: &str) -> Self {
        Self::new("NICK", Some(nickname.to_string()))
    }

    pub fn user(nickname: &str) -> Self {
        Self::new("USER", Some(format!("{} 0 * :{}", nickname, REALNAME)))
    }

    pub fn join(channel: &str) -> Self {
        Self::new("JOIN", Some(channel.to_string()))
    }

    pub fn pong(params: &str) -> Self {
        Self::new("PONG", Some(params.to_string()))
    }

    /// `QUIT`, with `:reason` when any reason words are given.
    pub fn quit(reason: &[&str]) -> Self {
        let params = if reason.is_empty() {
            None
        } else {
            Some(format!(":{}", reason.join(" ")))
        };
        Self::new("QUIT", params)
    }

    /// Render as a wire line ending in CR LF.
    pub fn to_line(&self) -> String {
        build_line(self.prefix.as_deref(), &self.command, self.params.as_deref())
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_line().trim_end_matches("\r\n"))
    }
}

/// Build `"{prefix }{command}{ params}\r\n"`.
///
/// An empty prefix or params is treated the same as an absent one.
pub fn build_line(prefix: Option<&str>, command: &str, params: Option<&str>) -> String {
    let mut line = String::with_capacity(
        command.len() + prefix.map_or(0, |p| p.len() + 1) + params.map_or(0, |p| p.len() + 1) + 2,
    );
    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        line.push_str(prefix);
        line.push(' ');
    }
    line.push_str(command);
    if let Some(params) = params.filter(|p| !p.is_empty()) {
        line.push(' ');
        line.push_str(params);
    }
    line.push_str("\r\n");
    line
}
