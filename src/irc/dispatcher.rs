//! Session state machine.
//!
//! Consumes parsed inbound messages and decides what to send back. Each
//! inbound message is checked against every rule independently, so one
//! message may trigger several rules.

use crate::config::ConnectionConfig;
use crate::irc::builder::OutboundMessage;
use crate::irc::commands::{BotCommand, CommandTable};
use crate::irc::message::{ParsedMessage, PREFIX_SENTINEL};
use tracing::debug;

const CMD_NOTICE: &str = "NOTICE";
const RPL_WELCOME: &str = "001";
const CMD_PING: &str = "PING";
const CMD_PRIVMSG: &str = "PRIVMSG";

/// Registration progress for one connection. Flags only ever go from
/// `false` to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub sent_identity: bool,
    pub joined_channel: bool,
}

/// Coarse view of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unregistered,
    IdentitySent,
    Registered { joined: bool },
}

impl SessionState {
    /// The two flags are independent: a server may send its welcome before
    /// any NOTICE, in which case the bot joins without having identified.
    /// That still counts as registered.
    pub fn phase(&self) -> Phase {
        match (self.sent_identity, self.joined_channel) {
            (false, false) => Phase::Unregistered,
            (true, false) => Phase::IdentitySent,
            (true, true) => Phase::Registered { joined: true },
            (false, true) => Phase::Registered { joined: true },
        }
    }
}

/// Where a channel message was addressed, relative to this bot.
#[derive(Debug, PartialEq, Eq)]
pub enum Destination {
    /// Sent to the configured channel.
    Public,
    /// Sent directly to the bot's nickname.
    Private,
    Other,
}

pub struct Dispatcher {
    nickname: String,
    channel: String,
    commands: CommandTable,
    state: SessionState,
}

impl Dispatcher {
    pub fn new(config: &ConnectionConfig) -> Self {
        Self::with_commands(config, CommandTable::default())
    }

    pub fn with_commands(config: &ConnectionConfig, commands: CommandTable) -> Self {
        Self {
            nickname: config.nickname.clone(),
            channel: config.channel.clone(),
            commands,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Apply one inbound message, returning the records to send in order.
    pub fn dispatch(&mut self, message: &ParsedMessage) -> Vec<OutboundMessage> {
        let mut out = Vec::new();

        if message.command == CMD_NOTICE && !self.state.sent_identity {
            out.push(OutboundMessage::nick(&self.nickname));
            out.push(OutboundMessage::user(&self.nickname));
            self.state.sent_identity = true;
        }

        if message.command == RPL_WELCOME && !self.state.joined_channel {
            out.push(OutboundMessage::join(&self.channel));
            self.state.joined_channel = true;
        }

        if message.command == CMD_PING {
            out.push(OutboundMessage::pong(&message.params));
        }

        if message.command == CMD_PRIVMSG {
            out.extend(self.handle_privmsg(message));
        }

        out
    }

    fn destination(&self, target: &str) -> Destination {
        if target == self.nickname {
            Destination::Private
        } else if target == self.channel {
            Destination::Public
        } else {
            Destination::Other
        }
    }

    fn handle_privmsg(&self, message: &ParsedMessage) -> Option<OutboundMessage> {
        let mut args = message.params.split(' ');
        let dest = args.next()?;
        let trigger = args.next()?;
        let trigger = trigger.strip_prefix(PREFIX_SENTINEL).unwrap_or(trigger);
        let rest: Vec<&str> = args.collect();

        match self.destination(dest) {
            // No private commands yet.
            Destination::Private => None,
            Destination::Public => {
                let command = self.commands.lookup(trigger)?;
                debug!(
                    source = message.source().unwrap_or_default(),
                    nick = message.source_nick().unwrap_or_default(),
                    ?command,
                    "Channel command"
                );
                Some(run_command(command, &rest))
            }
            Destination::Other => None,
        }
    }
}

fn run_command(command: BotCommand, args: &[&str]) -> OutboundMessage {
    match command {
        BotCommand::Quit => OutboundMessage::quit(args),
    }
}
